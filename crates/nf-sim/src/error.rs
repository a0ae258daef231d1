//! Error types for network construction and runtime use.

use nf_graph::GraphError;
use nf_links::LinkError;
use nf_solver::SolverError;
use thiserror::Error;

/// One problem found while initializing a network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("link '{link}' expects {expected} ports but is bound to {actual}")]
    PortCount {
        link: String,
        expected: usize,
        actual: usize,
    },

    #[error("island containing node '{node}' has no path to ground or a capacitive node")]
    MissingReference { island: usize, node: String },
}

/// Every problem found while initializing a network.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("network initialization failed:{}", list(.problems))]
pub struct InitializationError {
    pub problems: Vec<ConfigurationError>,
}

fn list(problems: &[ConfigurationError]) -> String {
    problems.iter().map(|p| format!("\n  - {p}")).collect()
}

/// Errors from runtime use of a network.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("unknown node '{name}'")]
    UnknownNode { name: String },

    #[error("unknown link '{name}'")]
    UnknownLink { name: String },

    #[error("checkpoint does not match network: {what}")]
    Checkpoint { what: String },

    #[error("step {step} failed at t={t}")]
    StepFailed { step: usize, t: f64 },

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("checkpoint encoding: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialization_error_lists_problems() {
        let err = InitializationError {
            problems: vec![
                ConfigurationError::Graph(GraphError::MissingGround),
                ConfigurationError::PortCount {
                    link: "r".into(),
                    expected: 2,
                    actual: 3,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("- link 'r' expects 2 ports"));
        assert_eq!(msg.lines().count(), 3);
    }
}
