//! Potential source with an internal conductance.

use std::any::Any;

use crate::common::{
    limit_conductance, port_drop, require_finite, require_non_negative, two_port_flows,
};
use crate::contribution::Contribution;
use crate::error::LinkResult;
use crate::traits::Link;

/// Drives port 1 to `source_potential` above port 0 through `conductance`.
///
/// Flux from port 0 to port 1 is `G * (p0 - p1 + V)`.
#[derive(Debug, Clone)]
pub struct Potential {
    name: String,
    pub conductance: f64,
    pub source_potential: f64,
    flux: f64,
}

impl Potential {
    pub fn new(name: impl Into<String>, conductance: f64, source_potential: f64) -> Self {
        Self {
            name: name.into(),
            conductance,
            source_potential,
            flux: 0.0,
        }
    }
}

impl Link for Potential {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> LinkResult<()> {
        require_non_negative(&self.name, "conductance", self.conductance)?;
        require_finite(&self.name, "source potential", self.source_potential)
    }

    fn contribute(&self, out: &mut Contribution) {
        let g = limit_conductance(self.conductance);
        out.add_conductance(0, 1, g);
        out.add_flux(0, 1, g * self.source_potential);
    }

    fn compute_flows(&mut self, potentials: &[f64], _dt: f64, flows: &mut [f64]) {
        let g = limit_conductance(self.conductance);
        self.flux = g * (port_drop(potentials) + self.source_potential);
        two_port_flows(self.flux, flows);
    }

    fn flux(&self) -> f64 {
        self.flux
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_stamp_raises_port_one() {
        let p = Potential::new("v", 2.0, 5.0);
        let mut c = Contribution::zeros(2);
        p.contribute(&mut c);
        assert_eq!(c.source()[0], -10.0);
        assert_eq!(c.source()[1], 10.0);
    }

    #[test]
    fn no_flux_at_source_potential() {
        let mut p = Potential::new("v", 2.0, 5.0);
        let mut flows = [0.0; 2];
        p.compute_flows(&[0.0, 5.0], 0.1, &mut flows);
        assert_eq!(p.flux(), 0.0);
    }
}
