//! Step reports.

use nf_core::NodeId;

use crate::error::SolverError;
use crate::health::HealthSignal;

/// Outcome of a major step, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SolveStatus {
    Converged,
    ConvergedDegraded,
    Failed,
}

impl SolveStatus {
    pub fn is_converged(self) -> bool {
        self != SolveStatus::Failed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IslandReport {
    pub island: usize,
    pub nodes: Vec<NodeId>,
    pub status: SolveStatus,
    pub minor_steps: usize,
    pub decompositions: usize,
    pub error: Option<SolverError>,
}

/// Result of `NetworkSolver::step`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Worst island status
    pub status: SolveStatus,
    /// Largest minor step count over all islands
    pub minor_steps: usize,
    pub islands: Vec<IslandReport>,
    /// Step-level problem not tied to an island (e.g. a bad time step)
    pub error: Option<SolverError>,
    pub health: Option<HealthSignal>,
}

impl StepReport {
    pub(crate) fn from_islands(islands: Vec<IslandReport>) -> Self {
        let status = islands
            .iter()
            .map(|i| i.status)
            .max()
            .unwrap_or(SolveStatus::Converged);
        let minor_steps = islands.iter().map(|i| i.minor_steps).max().unwrap_or(0);
        Self {
            status,
            minor_steps,
            islands,
            error: None,
            health: None,
        }
    }

    pub(crate) fn failed(error: SolverError) -> Self {
        Self {
            status: SolveStatus::Failed,
            minor_steps: 0,
            islands: Vec::new(),
            error: Some(error),
            health: None,
        }
    }

    /// Every error in the report, step-level first.
    pub fn errors(&self) -> impl Iterator<Item = &SolverError> {
        self.error
            .iter()
            .chain(self.islands.iter().filter_map(|i| i.error.as_ref()))
    }

    /// Report for the island containing `node`.
    pub fn island_of(&self, node: NodeId) -> Option<&IslandReport> {
        self.islands.iter().find(|i| i.nodes.contains(&node))
    }
}
