//! Core trait for link models.

use std::any::Any;

use crate::contribution::Contribution;
use crate::error::LinkResult;
use crate::state::LinkState;

/// Context handed to links while the solver iterates within a major step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinorStep {
    /// Major step time increment.
    pub dt: f64,
    /// 1-based minor step number within the major step.
    pub minor_step: usize,
    /// Tolerance the link should use to decide whether it changed.
    pub tolerance: f64,
    /// Potentials below this are too small to linearize around.
    pub min_linearization_potential: f64,
}

/// A network element connecting one or more nodes.
///
/// Port `i` of a link is bound to the i-th node in its port list. All port
/// quantities (potentials, flows, contribution rows/columns) use that order.
///
/// Call order within a major step:
/// 1. `step(dt)` once
/// 2. `contribute` / `update_from_potentials` for every minor step
/// 3. `compute_flows` once, after the island converged
pub trait Link: Send + Any {
    /// Link name for debugging and identification.
    fn name(&self) -> &str;

    /// Number of ports this link expects.
    fn port_count(&self) -> usize {
        2
    }

    /// Check parameters before the network starts.
    fn validate(&self) -> LinkResult<()>;

    /// True if the link may report changes during minor steps. The solver
    /// only calls `update_from_potentials` on nonlinear links.
    fn is_nonlinear(&self) -> bool {
        false
    }

    /// Advance internal state for a new major step.
    ///
    /// Returns true if the contribution changed since the last call.
    fn step(&mut self, _dt: f64) -> bool {
        false
    }

    /// Stamp admittance and source terms. `out` is cleared by the caller.
    fn contribute(&self, out: &mut Contribution);

    /// React to solved port potentials.
    ///
    /// Returns true if the contribution changed beyond `ctx.tolerance`, which
    /// asks the solver for another minor step.
    fn update_from_potentials(&mut self, _potentials: &[f64], _ctx: &MinorStep) -> bool {
        false
    }

    /// Compute the final flux for the step and write per-port flows
    /// (positive = into the node).
    fn compute_flows(&mut self, potentials: &[f64], dt: f64, flows: &mut [f64]);

    /// Flux through the link from the last `compute_flows`.
    fn flux(&self) -> f64;

    /// Internal state needed to resume from a checkpoint.
    fn save_state(&self) -> LinkState {
        LinkState::default()
    }

    fn restore_state(&mut self, _state: &LinkState) -> LinkResult<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
