//! Linear conductor with a blockage malfunction.

use std::any::Any;

use crate::common::{
    limit_conductance, port_drop, require_fraction, require_non_negative, two_port_flows,
};
use crate::contribution::Contribution;
use crate::error::LinkResult;
use crate::state::LinkState;
use crate::traits::Link;

/// Passive conductance between two nodes.
///
/// Effective conductance is `conductance * (1 - blockage)` while the blockage
/// malfunction is active.
#[derive(Debug, Clone)]
pub struct Conductor {
    name: String,
    /// Default conductance
    pub conductance: f64,
    /// Blockage fraction in [0, 1], applied when `blockage_active` is set
    pub blockage: f64,
    pub blockage_active: bool,
    effective: f64,
    drop: f64,
    flux: f64,
}

impl Conductor {
    pub fn new(name: impl Into<String>, conductance: f64) -> Self {
        let mut link = Self {
            name: name.into(),
            conductance,
            blockage: 0.0,
            blockage_active: false,
            effective: 0.0,
            drop: 0.0,
            flux: 0.0,
        };
        link.effective = link.target_conductance();
        link
    }

    /// Activate the blockage malfunction with the given fraction.
    pub fn set_blockage(&mut self, fraction: f64) {
        self.blockage = fraction;
        self.blockage_active = true;
    }

    pub fn clear_blockage(&mut self) {
        self.blockage_active = false;
    }

    /// Conductance currently stamped into the system.
    pub fn effective_conductance(&self) -> f64 {
        self.effective
    }

    /// Potential drop across the link from the last `compute_flows`.
    pub fn potential_drop(&self) -> f64 {
        self.drop
    }

    fn target_conductance(&self) -> f64 {
        let open = if self.blockage_active {
            1.0 - self.blockage.clamp(0.0, 1.0)
        } else {
            1.0
        };
        limit_conductance(self.conductance * open)
    }
}

impl Link for Conductor {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> LinkResult<()> {
        require_non_negative(&self.name, "conductance", self.conductance)?;
        require_fraction(&self.name, "blockage", self.blockage)
    }

    fn step(&mut self, _dt: f64) -> bool {
        let g = self.target_conductance();
        let changed = g != self.effective;
        self.effective = g;
        changed
    }

    fn contribute(&self, out: &mut Contribution) {
        out.add_conductance(0, 1, self.effective);
    }

    fn compute_flows(&mut self, potentials: &[f64], _dt: f64, flows: &mut [f64]) {
        self.drop = port_drop(potentials);
        self.flux = self.effective * self.drop;
        two_port_flows(self.flux, flows);
    }

    fn flux(&self) -> f64 {
        self.flux
    }

    fn save_state(&self) -> LinkState {
        LinkState::new().with("effective_conductance", self.effective)
    }

    fn restore_state(&mut self, state: &LinkState) -> LinkResult<()> {
        self.effective = state.require(&self.name, "effective_conductance")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
