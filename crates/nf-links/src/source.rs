//! Forced flux source.

use std::any::Any;

use crate::common::{require_finite, two_port_flows};
use crate::contribution::Contribution;
use crate::error::LinkResult;
use crate::traits::Link;

/// Forces `flux` out of port 0 and into port 1 regardless of potentials.
#[derive(Debug, Clone)]
pub struct FluxSource {
    name: String,
    pub flux_demand: f64,
    flux: f64,
}

impl FluxSource {
    pub fn new(name: impl Into<String>, flux_demand: f64) -> Self {
        Self {
            name: name.into(),
            flux_demand,
            flux: 0.0,
        }
    }
}

impl Link for FluxSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> LinkResult<()> {
        require_finite(&self.name, "flux demand", self.flux_demand)
    }

    fn contribute(&self, out: &mut Contribution) {
        out.add_flux(0, 1, self.flux_demand);
    }

    fn compute_flows(&mut self, _potentials: &[f64], _dt: f64, flows: &mut [f64]) {
        self.flux = self.flux_demand;
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
    fn stamps_source_only() {
        let s = FluxSource::new("i", 3.0);
        let mut c = Contribution::zeros(2);
        s.contribute(&mut c);
        assert_eq!(c.admittance().iter().sum::<f64>(), 0.0);
        assert_eq!(c.source()[1], 3.0);
    }
}
