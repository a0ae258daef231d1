//! Island-local row indexing.
//!
//! The solver stores one matrix per island; `RowMap` translates between
//! global node ids and rows of that island's matrix.

use std::collections::HashMap;

use nf_core::NodeId;

use crate::island::Island;

/// Bidirectional node <-> row mapping for one island.
#[derive(Debug, Clone, Default)]
pub struct RowMap {
    nodes: Vec<NodeId>,
    rows: HashMap<NodeId, usize>,
}

impl RowMap {
    pub fn for_island(island: &Island) -> Self {
        Self::from_nodes(&island.nodes)
    }

    pub fn from_nodes(nodes: &[NodeId]) -> Self {
        let rows = nodes.iter().enumerate().map(|(row, &n)| (n, row)).collect();
        Self {
            nodes: nodes.to_vec(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Row of a node, `None` when the node is not in this island (e.g. ground).
    pub fn row(&self, node: NodeId) -> Option<usize> {
        self.rows.get(&node).copied()
    }

    /// Node stored at `row` (panics if out of bounds).
    pub fn node(&self, row: usize) -> NodeId {
        self.nodes[row]
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_map_round_trip() {
        let nodes = [NodeId::from_index(3), NodeId::from_index(7)];
        let map = RowMap::from_nodes(&nodes);
        assert_eq!(map.len(), 2);
        assert_eq!(map.row(nodes[1]), Some(1));
        assert_eq!(map.node(0), nodes[0]);
        assert_eq!(map.row(NodeId::from_index(0)), None);
    }
}
