//! System matrix assembly.
//!
//! One `IslandSystem` per island holds the matrix and source vector in island
//! row order. Ground never gets a row: admittance terms in a ground column are
//! moved to the right-hand side using the ground potential.

use nalgebra::{DMatrix, DVector};
use nf_core::NodeId;
use nf_graph::{Island, RowMap};
use nf_links::Contribution;

use crate::node::NodeState;
use crate::slot::LinkSlot;

/// Matrix and source vector for one island.
#[derive(Debug, Clone)]
pub struct IslandSystem {
    rows: RowMap,
    matrix: DMatrix<f64>,
    source: DVector<f64>,
}

impl IslandSystem {
    pub fn new(rows: RowMap) -> Self {
        let n = rows.len();
        Self {
            rows,
            matrix: DMatrix::zeros(n, n),
            source: DVector::zeros(n),
        }
    }

    pub fn for_island(island: &Island) -> Self {
        Self::new(RowMap::for_island(island))
    }

    pub fn rows(&self) -> &RowMap {
        &self.rows
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn source(&self) -> &DVector<f64> {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum cached link contributions and node capacitance terms.
    ///
    /// Slots are summed in the order given; disabled slots are skipped. Returns
    /// a description of the offending link if a contribution is not finite.
    pub fn assemble<'a, I>(&mut self, slots: I, nodes: &[NodeState], dt: f64) -> Result<(), String>
    where
        I: IntoIterator<Item = &'a LinkSlot>,
    {
        self.matrix.fill(0.0);
        self.source.fill(0.0);

        for slot in slots {
            if !slot.enabled {
                continue;
            }
            let c = slot.contribution();
            if !c.is_finite() {
                return Err(format!(
                    "link '{}' produced a non-finite contribution",
                    slot.link().name()
                ));
            }
            for (i, port_i) in slot.ports.iter().enumerate() {
                let Some(row) = self.rows.row(*port_i) else {
                    continue;
                };
                self.source[row] += c.source()[i];
                for (j, port_j) in slot.ports.iter().enumerate() {
                    let a = c.admittance()[(i, j)];
                    if a == 0.0 {
                        continue;
                    }
                    match self.rows.row(*port_j) {
                        Some(col) => self.matrix[(row, col)] += a,
                        None => self.source[row] -= a * nodes[port_j.slot()].potential,
                    }
                }
            }
        }

        for (row, node) in self.rows.nodes().iter().enumerate() {
            let state = &nodes[node.slot()];
            let y = state.capacitive_admittance(dt);
            if y > 0.0 {
                self.matrix[(row, row)] += y;
                self.source[row] += y * state.previous_potential();
            }
        }

        Ok(())
    }
}

/// True when the island can be referenced: one of its links puts admittance
/// on a ground port (`grounded`, indexed by link slot), or one of its nodes
/// is capacitive.
pub fn island_has_reference(island: &Island, nodes: &[NodeState], grounded: &[bool]) -> bool {
    island
        .links
        .iter()
        .any(|l| grounded.get(l.slot()).copied().unwrap_or(false))
        || island
            .nodes
            .iter()
            .any(|n| nodes.get(n.slot()).is_some_and(|s| s.capacitance > 0.0))
}

/// True when `contribution` has a non-zero diagonal admittance on a port
/// bound to `ground`.
pub fn grounds_admittance(ports: &[NodeId], ground: NodeId, contribution: &Contribution) -> bool {
    ports.iter().enumerate().any(|(k, port)| {
        *port == ground
            && k < contribution.port_count()
            && contribution.admittance()[(k, k)] != 0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::LinkId;
    use nf_links::{Conductor, Potential};

    fn slot(index: u32, ports: &[u32], link: Box<dyn nf_links::Link>) -> LinkSlot {
        let ports = ports.iter().map(|&p| NodeId::from_index(p)).collect();
        let mut s = LinkSlot::new(LinkId::from_index(index), ports, link);
        s.refresh();
        s
    }

    #[test]
    fn ground_column_moves_to_source() {
        // node 0 is ground at 5.0, node 1 is the island
        let nodes = vec![NodeState::new(5.0, 0.0), NodeState::new(0.0, 0.0)];
        let r = slot(0, &[1, 0], Box::new(Conductor::new("r", 2.0)));
        let mut sys = IslandSystem::new(RowMap::from_nodes(&[NodeId::from_index(1)]));
        sys.assemble([&r], &nodes, 0.1).unwrap();
        assert_eq!(sys.matrix()[(0, 0)], 2.0);
        assert_eq!(sys.source()[0], 10.0);
    }

    #[test]
    fn potential_source_from_ground() {
        let nodes = vec![NodeState::new(0.0, 0.0), NodeState::new(0.0, 0.0)];
        let v = slot(0, &[0, 1], Box::new(Potential::new("v", 4.0, 3.0)));
        let mut sys = IslandSystem::new(RowMap::from_nodes(&[NodeId::from_index(1)]));
        sys.assemble([&v], &nodes, 0.1).unwrap();
        assert_eq!(sys.matrix()[(0, 0)], 4.0);
        assert_eq!(sys.source()[0], 12.0);
    }

    #[test]
    fn capacitive_node_terms() {
        let mut nodes = vec![NodeState::new(0.0, 0.0), NodeState::new(7.0, 1.0)];
        nodes[1].begin_step();
        let mut sys = IslandSystem::new(RowMap::from_nodes(&[NodeId::from_index(1)]));
        sys.assemble(std::iter::empty::<&LinkSlot>(), &nodes, 0.5).unwrap();
        assert_eq!(sys.matrix()[(0, 0)], 2.0);
        assert_eq!(sys.source()[0], 14.0);
    }

    #[test]
    fn disabled_links_are_skipped() {
        let nodes = vec![NodeState::new(0.0, 0.0), NodeState::new(0.0, 0.0)];
        let mut r = slot(0, &[1, 0], Box::new(Conductor::new("r", 2.0)));
        r.enabled = false;
        let mut sys = IslandSystem::new(RowMap::from_nodes(&[NodeId::from_index(1)]));
        sys.assemble([&r], &nodes, 0.1).unwrap();
        assert_eq!(sys.matrix()[(0, 0)], 0.0);
    }

    #[test]
    fn only_admittance_on_ground_counts() {
        let gnd = NodeId::from_index(0);
        let ports = [gnd, NodeId::from_index(1)];
        let mut c = Contribution::zeros(2);
        c.add_flux(0, 1, 3.0);
        assert!(!grounds_admittance(&ports, gnd, &c));
        c.add_conductance(0, 1, 0.5);
        assert!(grounds_admittance(&ports, gnd, &c));
        assert!(!grounds_admittance(&ports, NodeId::from_index(2), &c));
    }

    #[test]
    fn non_finite_contribution_is_reported() {
        let nodes = vec![NodeState::new(0.0, 0.0), NodeState::new(0.0, 0.0)];
        let r = slot(0, &[1, 0], Box::new(Potential::new("v", 1.0, f64::NAN)));
        let mut sys = IslandSystem::new(RowMap::from_nodes(&[NodeId::from_index(1)]));
        let err = sys.assemble([&r], &nodes, 0.1).unwrap_err();
        assert!(err.contains("'v'"));
    }
}
