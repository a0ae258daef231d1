//! Solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// How link contributions are gathered each minor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyMode {
    /// Every link re-contributes every minor step.
    Full,
    /// Only links marked dirty re-contribute; others reuse their cached terms.
    #[default]
    Incremental,
}

/// What to do when an island runs out of minor steps (or decompositions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonConvergencePolicy {
    /// Keep the last solution and report `ConvergedDegraded`.
    #[default]
    Degrade,
    /// Report `Failed` and restore the start-of-step potentials.
    Fail,
}

/// Tunable solver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relative change a link may report before asking for another minor step
    pub convergence_tolerance: f64,
    /// Looser tolerance used once the preferred budget is spent
    pub relaxed_tolerance: f64,
    /// Minor steps allowed at `convergence_tolerance`
    pub max_minor_steps: usize,
    /// Additional minor steps allowed at `relaxed_tolerance`
    pub relaxed_minor_steps: usize,
    pub on_nonconvergence: NonConvergencePolicy,
    /// Fresh matrix decompositions allowed per island per major step
    pub decomposition_limit: usize,
    /// Potentials below this are not linearized around by nonlinear links
    pub min_linearization_potential: f64,
    /// Row sums and relative pivots at or below this are treated as singular
    pub singular_threshold: f64,
    pub assembly: AssemblyMode,
    /// Solve independent islands on the rayon pool
    pub parallel_islands: bool,
    /// Consecutive degraded/failed major steps before a health signal
    pub health_streak_threshold: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            convergence_tolerance: 1.0e-3,
            relaxed_tolerance: 1.0e-2,
            max_minor_steps: 10,
            relaxed_minor_steps: 10,
            on_nonconvergence: NonConvergencePolicy::Degrade,
            decomposition_limit: 20,
            min_linearization_potential: 1.0e-3,
            singular_threshold: 1.0e-14,
            assembly: AssemblyMode::Incremental,
            parallel_islands: false,
            health_streak_threshold: 5,
        }
    }
}

impl SolverConfig {
    /// Check every field and report all problems at once.
    pub fn validate(&self) -> Result<(), Vec<SolverError>> {
        let mut problems = Vec::new();
        let mut bad = |field: &'static str, what: String| {
            problems.push(SolverError::Configuration { field, what });
        };

        if !(self.convergence_tolerance.is_finite() && self.convergence_tolerance > 0.0) {
            bad(
                "convergence_tolerance",
                format!("must be finite and > 0, got {}", self.convergence_tolerance),
            );
        }
        if !(self.relaxed_tolerance.is_finite() && self.relaxed_tolerance > 0.0) {
            bad(
                "relaxed_tolerance",
                format!("must be finite and > 0, got {}", self.relaxed_tolerance),
            );
        } else if self.relaxed_tolerance < self.convergence_tolerance {
            bad(
                "relaxed_tolerance",
                "must not be tighter than convergence_tolerance".to_string(),
            );
        }
        if self.max_minor_steps == 0 {
            bad("max_minor_steps", "must be at least 1".to_string());
        }
        if self.decomposition_limit == 0 {
            bad("decomposition_limit", "must be at least 1".to_string());
        }
        if !(self.min_linearization_potential.is_finite() && self.min_linearization_potential >= 0.0)
        {
            bad(
                "min_linearization_potential",
                format!("must be finite and >= 0, got {}", self.min_linearization_potential),
            );
        }
        if !(self.singular_threshold > 0.0 && self.singular_threshold < 1.0) {
            bad(
                "singular_threshold",
                format!("must be in (0, 1), got {}", self.singular_threshold),
            );
        }
        if self.health_streak_threshold == 0 {
            bad("health_streak_threshold", "must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// Total minor steps an island may take in one major step.
    pub fn minor_step_budget(&self) -> usize {
        self.max_minor_steps + self.relaxed_minor_steps
    }
}
