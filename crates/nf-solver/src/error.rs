//! Error types for solver operations.

use nf_core::NodeId;
use thiserror::Error;

/// Errors that can occur while configuring or stepping a network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("invalid solver configuration: {field}: {what}")]
    Configuration { field: &'static str, what: String },

    #[error("island {island}: singular system matrix{}", at_node(.node))]
    SingularMatrix {
        island: usize,
        node: Option<NodeId>,
    },

    #[error("island {island}: no convergence after {minor_steps} minor steps")]
    ConvergenceFailure { island: usize, minor_steps: usize },

    #[error("island {island}: {what}")]
    RuntimeInvariant { island: usize, what: String },

    #[error("island {island}: decomposition limit of {limit} reached")]
    DecompositionLimit { island: usize, limit: usize },

    #[error("invalid time step: {dt}")]
    InvalidTimeStep { dt: f64 },
}

fn at_node(node: &Option<NodeId>) -> String {
    match node {
        Some(n) => format!(" at node {n}"),
        None => String::new(),
    }
}

impl SolverError {
    /// Island the error belongs to, if it is island-local.
    pub fn island(&self) -> Option<usize> {
        match self {
            SolverError::SingularMatrix { island, .. }
            | SolverError::ConvergenceFailure { island, .. }
            | SolverError::RuntimeInvariant { island, .. }
            | SolverError::DecompositionLimit { island, .. } => Some(*island),
            SolverError::Configuration { .. } | SolverError::InvalidTimeStep { .. } => None,
        }
    }
}

pub type SolverResult<T> = Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_message_names_node() {
        let err = SolverError::SingularMatrix {
            island: 2,
            node: Some(NodeId::from_index(4)),
        };
        assert_eq!(err.to_string(), "island 2: singular system matrix at node 4");
        let err = SolverError::SingularMatrix {
            island: 0,
            node: None,
        };
        assert_eq!(err.to_string(), "island 0: singular system matrix");
        assert_eq!(err.island(), Some(0));
        assert_eq!(SolverError::InvalidTimeStep { dt: -1.0 }.island(), None);
    }
}
