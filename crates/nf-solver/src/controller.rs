//! Per-island convergence state machine.

use crate::config::{NonConvergencePolicy, SolverConfig};
use crate::error::SolverError;
use crate::report::SolveStatus;

/// Tolerance phase of an island that is still iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Preferred,
    Relaxed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IslandState {
    Initial,
    Solving {
        phase: Phase,
        minor_steps_in_phase: usize,
    },
    Converged,
    ConvergedDegraded,
    Failed(SolverError),
}

/// Drives one island from `Initial` to a terminal state within a major step.
#[derive(Debug, Clone)]
pub struct ConvergenceController {
    island: usize,
    state: IslandState,
    minor_steps: usize,
}

impl ConvergenceController {
    pub fn new(island: usize) -> Self {
        Self {
            island,
            state: IslandState::Initial,
            minor_steps: 0,
        }
    }

    pub fn state(&self) -> &IslandState {
        &self.state
    }

    /// Minor steps taken in the current major step.
    pub fn minor_steps(&self) -> usize {
        self.minor_steps
    }

    pub fn is_solving(&self) -> bool {
        matches!(self.state, IslandState::Solving { .. })
    }

    /// Start a major step.
    pub fn begin(&mut self) {
        self.minor_steps = 0;
        self.state = IslandState::Solving {
            phase: Phase::Preferred,
            minor_steps_in_phase: 0,
        };
    }

    /// Nothing to iterate (idle island).
    pub fn settle(&mut self) {
        self.state = IslandState::Converged;
    }

    /// Tolerance links should use for the current phase.
    pub fn tolerance(&self, config: &SolverConfig) -> f64 {
        match self.state {
            IslandState::Solving {
                phase: Phase::Relaxed,
                ..
            } => config.relaxed_tolerance,
            _ => config.convergence_tolerance,
        }
    }

    pub fn fail(&mut self, err: SolverError) {
        self.state = IslandState::Failed(err);
    }

    /// Record the outcome of one minor step.
    pub fn advance(&mut self, changed: bool, config: &SolverConfig) {
        let IslandState::Solving {
            phase,
            minor_steps_in_phase,
        } = self.state
        else {
            return;
        };
        self.minor_steps += 1;
        let taken = minor_steps_in_phase + 1;

        if !changed {
            self.state = match phase {
                Phase::Preferred => IslandState::Converged,
                Phase::Relaxed => IslandState::ConvergedDegraded,
            };
            return;
        }

        self.state = match phase {
            Phase::Preferred if taken >= config.max_minor_steps => {
                if config.relaxed_minor_steps == 0 {
                    self.exhausted(config.on_nonconvergence, None)
                } else {
                    IslandState::Solving {
                        phase: Phase::Relaxed,
                        minor_steps_in_phase: 0,
                    }
                }
            }
            Phase::Relaxed if taken >= config.relaxed_minor_steps => {
                self.exhausted(config.on_nonconvergence, None)
            }
            _ => IslandState::Solving {
                phase,
                minor_steps_in_phase: taken,
            },
        };
    }

    /// The decomposition budget ran out before convergence.
    pub fn decomposition_limit(&mut self, config: &SolverConfig) {
        let err = SolverError::DecompositionLimit {
            island: self.island,
            limit: config.decomposition_limit,
        };
        self.state = self.exhausted(config.on_nonconvergence, Some(err));
    }

    fn exhausted(&self, policy: NonConvergencePolicy, cause: Option<SolverError>) -> IslandState {
        match policy {
            NonConvergencePolicy::Degrade => IslandState::ConvergedDegraded,
            NonConvergencePolicy::Fail => IslandState::Failed(cause.unwrap_or(
                SolverError::ConvergenceFailure {
                    island: self.island,
                    minor_steps: self.minor_steps,
                },
            )),
        }
    }

    /// Terminal status, or `None` while still solving.
    pub fn status(&self) -> Option<SolveStatus> {
        match self.state {
            IslandState::Converged => Some(SolveStatus::Converged),
            IslandState::ConvergedDegraded => Some(SolveStatus::ConvergedDegraded),
            IslandState::Failed(_) => Some(SolveStatus::Failed),
            IslandState::Initial | IslandState::Solving { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&SolverError> {
        match &self.state {
            IslandState::Failed(err) => Some(err),
            _ => None,
        }
    }
}
