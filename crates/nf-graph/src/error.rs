//! Topology error types.

use nf_core::{LinkId, NodeId};

/// One topology construction problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A link port refers to a node that doesn't exist.
    InvalidNodeRef { link: String, port: usize, node: NodeId },

    /// A link was bound with no ports.
    NoPorts { link: String },

    /// Two links share a name.
    DuplicateLinkName { name: String, first: LinkId, second: LinkId },

    /// Two nodes share a name.
    DuplicateNodeName { name: String },

    /// No ground node was declared.
    MissingGround,

    /// More than one ground node was declared.
    MultipleGrounds { count: usize },

    /// A node's initial state is out of range.
    InvalidNodeState { node: String, what: &'static str },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidNodeRef { link, port, node } => {
                write!(f, "Link '{}' port {} refers to non-existent node {}", link, port, node)
            }
            GraphError::NoPorts { link } => write!(f, "Link '{}' has no ports", link),
            GraphError::DuplicateLinkName {
                name,
                first,
                second,
            } => write!(
                f,
                "Duplicate link name '{}' (links {} and {})",
                name, first, second
            ),
            GraphError::DuplicateNodeName { name } => {
                write!(f, "Duplicate node name '{}'", name)
            }
            GraphError::MissingGround => write!(f, "Network has no ground node"),
            GraphError::MultipleGrounds { count } => {
                write!(f, "Network declares {} ground nodes (expected 1)", count)
            }
            GraphError::InvalidNodeState { node, what } => {
                write!(f, "Node '{}' has invalid {}", node, what)
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Every problem found while building a topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphErrors(pub Vec<GraphError>);

impl GraphErrors {
    pub fn iter(&self) -> impl Iterator<Item = &GraphError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for GraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} topology error(s)", self.0.len())?;
        for err in &self.0 {
            write!(f, "; {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphErrors {}

impl From<GraphError> for GraphErrors {
    fn from(err: GraphError) -> Self {
        GraphErrors(vec![err])
    }
}
