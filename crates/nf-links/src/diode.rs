//! Two-state diode.

use std::any::Any;

use crate::common::{limit_conductance, port_drop, require_non_negative, two_port_flows};
use crate::contribution::Contribution;
use crate::error::{LinkError, LinkResult};
use crate::state::LinkState;
use crate::traits::{Link, MinorStep};

/// Conducts with `forward_conductance` from anode (port 0) to cathode
/// (port 1) and with `reverse_conductance` otherwise.
///
/// The state flips when the solved bias disagrees with it, which asks the
/// solver for another minor step.
#[derive(Debug, Clone)]
pub struct Diode {
    name: String,
    pub forward_conductance: f64,
    pub reverse_conductance: f64,
    forward: bool,
    flux: f64,
}

impl Diode {
    pub fn new(name: impl Into<String>, forward_conductance: f64, reverse_conductance: f64) -> Self {
        Self {
            name: name.into(),
            forward_conductance,
            reverse_conductance,
            forward: false,
            flux: 0.0,
        }
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    fn conductance(&self) -> f64 {
        limit_conductance(if self.forward {
            self.forward_conductance
        } else {
            self.reverse_conductance
        })
    }
}

impl Link for Diode {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> LinkResult<()> {
        require_non_negative(&self.name, "forward conductance", self.forward_conductance)?;
        require_non_negative(&self.name, "reverse conductance", self.reverse_conductance)?;
        if self.reverse_conductance > self.forward_conductance {
            return Err(LinkError::InvalidArg {
                link: self.name.clone(),
                what: "reverse conductance exceeds forward conductance",
            });
        }
        Ok(())
    }

    fn is_nonlinear(&self) -> bool {
        true
    }

    fn contribute(&self, out: &mut Contribution) {
        out.add_conductance(0, 1, self.conductance());
    }

    fn update_from_potentials(&mut self, potentials: &[f64], _ctx: &MinorStep) -> bool {
        let bias = port_drop(potentials);
        let forward = if self.forward { bias >= 0.0 } else { bias > 0.0 };
        let changed = forward != self.forward;
        self.forward = forward;
        changed
    }

    fn compute_flows(&mut self, potentials: &[f64], _dt: f64, flows: &mut [f64]) {
        self.flux = self.conductance() * port_drop(potentials);
        two_port_flows(self.flux, flows);
    }

    fn flux(&self) -> f64 {
        self.flux
    }

    fn save_state(&self) -> LinkState {
        LinkState::new().with("forward", if self.forward { 1.0 } else { 0.0 })
    }

    fn restore_state(&mut self, state: &LinkState) -> LinkResult<()> {
        self.forward = state.require(&self.name, "forward")? != 0.0;
        Ok(())
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

    fn ctx() -> MinorStep {
        MinorStep {
            dt: 0.1,
            minor_step: 1,
            tolerance: 1e-3,
            min_linearization_potential: 1e-3,
        }
    }

    #[test]
    fn flips_on_bias() {
        let mut d = Diode::new("d", 100.0, 1e-6);
        assert!(!d.is_forward());
        assert!(d.update_from_potentials(&[5.0, 0.0], &ctx()));
        assert!(d.is_forward());
        assert!(!d.update_from_potentials(&[5.0, 0.0], &ctx()));
        assert!(d.update_from_potentials(&[-1.0, 0.0], &ctx()));
        assert!(!d.is_forward());
    }

    #[test]
    fn reverse_must_not_exceed_forward() {
        assert!(Diode::new("d", 1.0, 2.0).validate().is_err());
        assert!(Diode::new("d", 2.0, 0.0).validate().is_ok());
    }
}
