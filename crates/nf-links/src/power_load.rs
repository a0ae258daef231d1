//! Constant power load.

use std::any::Any;

use nf_core::numeric::{nearly_equal, Tolerances};

use crate::common::{limit_conductance, port_drop, require_non_negative, two_port_flows};
use crate::contribution::Contribution;
use crate::error::LinkResult;
use crate::state::LinkState;
use crate::traits::{Link, MinorStep};

/// Draws constant power from port 0 to port 1 by linearizing to `G = P/V²`.
///
/// Below the minimum linearization potential the load trips to zero
/// conductance.
#[derive(Debug, Clone)]
pub struct ConstantPowerLoad {
    name: String,
    pub power: f64,
    conductance: f64,
    flux: f64,
}

impl ConstantPowerLoad {
    pub fn new(name: impl Into<String>, power: f64) -> Self {
        Self {
            name: name.into(),
            power,
            conductance: 0.0,
            flux: 0.0,
        }
    }

    /// Seed the linearization from an expected supply potential.
    pub fn with_expected_potential(mut self, potential: f64) -> Self {
        self.conductance = self.linearize(potential, 0.0);
        self
    }

    pub fn conductance(&self) -> f64 {
        self.conductance
    }

    fn linearize(&self, drop: f64, min_potential: f64) -> f64 {
        if drop.is_finite() && drop > 0.0 && drop >= min_potential {
            limit_conductance(self.power / (drop * drop))
        } else {
            0.0
        }
    }
}

impl Link for ConstantPowerLoad {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> LinkResult<()> {
        require_non_negative(&self.name, "power", self.power)
    }

    fn is_nonlinear(&self) -> bool {
        true
    }

    fn contribute(&self, out: &mut Contribution) {
        out.add_conductance(0, 1, self.conductance);
    }

    fn update_from_potentials(&mut self, potentials: &[f64], ctx: &MinorStep) -> bool {
        let g = self.linearize(port_drop(potentials), ctx.min_linearization_potential);
        let tol = Tolerances {
            abs: 0.0,
            rel: ctx.tolerance,
        };
        let changed = !nearly_equal(self.conductance, g, tol);
        // Keep the stamped value while within tolerance.
        if changed {
            self.conductance = g;
        }
        changed
    }

    fn compute_flows(&mut self, potentials: &[f64], _dt: f64, flows: &mut [f64]) {
        self.flux = self.conductance * port_drop(potentials);
        two_port_flows(self.flux, flows);
    }

    fn flux(&self) -> f64 {
        self.flux
    }

    fn save_state(&self) -> LinkState {
        LinkState::new().with("conductance", self.conductance)
    }

    fn restore_state(&mut self, state: &LinkState) -> LinkResult<()> {
        self.conductance = state.require(&self.name, "conductance")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
