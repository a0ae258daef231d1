//! Capacitor between two nodes.

use std::any::Any;

use crate::common::{limit_conductance, port_drop, require_finite, require_non_negative, two_port_flows};
use crate::contribution::Contribution;
use crate::error::LinkResult;
use crate::state::LinkState;
use crate::traits::Link;

/// Stores potential across ports 0 and 1.
///
/// Integrated with backward Euler: admittance `C/dt` plus a source that holds
/// the previous potential drop.
#[derive(Debug, Clone)]
pub struct Capacitor {
    name: String,
    pub capacitance: f64,
    drop: f64,
    admittance: f64,
    flux: f64,
}

impl Capacitor {
    pub fn new(name: impl Into<String>, capacitance: f64, initial_drop: f64) -> Self {
        Self {
            name: name.into(),
            capacitance,
            drop: initial_drop,
            admittance: 0.0,
            flux: 0.0,
        }
    }

    /// Potential drop stored at the end of the last step.
    pub fn potential_drop(&self) -> f64 {
        self.drop
    }

    /// Override the stored drop, e.g. for an initial condition.
    pub fn set_potential_drop(&mut self, drop: f64) {
        self.drop = drop;
    }
}

impl Link for Capacitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> LinkResult<()> {
        require_non_negative(&self.name, "capacitance", self.capacitance)?;
        require_finite(&self.name, "initial potential drop", self.drop)
    }

    fn step(&mut self, dt: f64) -> bool {
        let admittance = if dt > 0.0 {
            limit_conductance(self.capacitance / dt)
        } else {
            0.0
        };
        let changed = admittance != self.admittance;
        self.admittance = admittance;
        // The history source moves with the stored drop every step.
        changed || admittance > 0.0
    }

    fn contribute(&self, out: &mut Contribution) {
        out.add_conductance(0, 1, self.admittance);
        out.add_flux(1, 0, self.admittance * self.drop);
    }

    fn compute_flows(&mut self, potentials: &[f64], dt: f64, flows: &mut [f64]) {
        if dt <= 0.0 {
            self.flux = 0.0;
            two_port_flows(0.0, flows);
            return;
        }
        let drop = port_drop(potentials);
        self.flux = self.admittance * (drop - self.drop);
        self.drop = drop;
        two_port_flows(self.flux, flows);
    }

    fn flux(&self) -> f64 {
        self.flux
    }

    fn save_state(&self) -> LinkState {
        LinkState::new().with("potential_drop", self.drop)
    }

    fn restore_state(&mut self, state: &LinkState) -> LinkResult<()> {
        self.drop = state.require(&self.name, "potential_drop")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
