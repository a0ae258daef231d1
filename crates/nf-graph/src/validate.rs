//! Topology validation.

use std::collections::{HashMap, HashSet};

use crate::error::GraphError;
use crate::graph::{LinkBinding, Node};

/// Check node and link definitions, collecting every problem found.
pub(crate) fn validate_topology(nodes: &[Node], links: &[LinkBinding]) -> Vec<GraphError> {
    let mut errors = Vec::new();

    let grounds = nodes.iter().filter(|n| n.is_ground()).count();
    match grounds {
        0 => errors.push(GraphError::MissingGround),
        1 => {}
        count => errors.push(GraphError::MultipleGrounds { count }),
    }

    let mut node_names = HashSet::new();
    for node in nodes {
        if !node_names.insert(node.name.as_str()) {
            errors.push(GraphError::DuplicateNodeName {
                name: node.name.clone(),
            });
        }
        if !node.potential.is_finite() {
            errors.push(GraphError::InvalidNodeState {
                node: node.name.clone(),
                what: "initial potential",
            });
        }
        if !node.capacitance.is_finite() || node.capacitance < 0.0 {
            errors.push(GraphError::InvalidNodeState {
                node: node.name.clone(),
                what: "capacitance",
            });
        }
    }

    let mut link_names = HashMap::new();
    for link in links {
        if let Some(first) = link_names.insert(link.name.as_str(), link.id) {
            errors.push(GraphError::DuplicateLinkName {
                name: link.name.clone(),
                first,
                second: link.id,
            });
        }
        if link.ports.is_empty() {
            errors.push(GraphError::NoPorts {
                link: link.name.clone(),
            });
        }
        for (port, node) in link.ports.iter().enumerate() {
            if node.slot() >= nodes.len() {
                errors.push(GraphError::InvalidNodeRef {
                    link: link.name.clone(),
                    port,
                    node: *node,
                });
            }
        }
    }

    errors
}
