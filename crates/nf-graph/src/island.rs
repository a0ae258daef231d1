//! Island (connected component) partitioning.
//!
//! Islands are maximal sets of non-ground nodes joined by enabled links.
//! Ground is the shared reference and never joins two islands together.

use nf_core::{LinkId, NodeId};
use petgraph::unionfind::UnionFind;
use tracing::debug;

use crate::graph::Topology;

/// One connected component of the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Island {
    /// Non-ground nodes, ascending.
    pub nodes: Vec<NodeId>,
    /// Enabled links with at least one port in this island, ascending.
    pub links: Vec<LinkId>,
    /// True when at least one of the island's links has a port on ground.
    pub touches_ground: bool,
}

impl Island {
    /// An island without links has nothing to solve; its potentials are held.
    pub fn is_idle(&self) -> bool {
        self.links.is_empty()
    }
}

/// Partition of a topology into islands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IslandSet {
    membership: Vec<Option<usize>>,
    islands: Vec<Island>,
    reference_links: Vec<LinkId>,
}

impl IslandSet {
    /// Partition `topology` using only the links whose `enabled` flag is set.
    ///
    /// `enabled` is indexed by link slot; missing entries count as enabled.
    pub fn compute(topology: &Topology, enabled: &[bool]) -> Self {
        let node_count = topology.node_count();
        let ground = topology.ground();
        let is_enabled = |slot: usize| enabled.get(slot).copied().unwrap_or(true);

        let mut uf = UnionFind::<usize>::new(node_count);
        for link in topology.links() {
            if !is_enabled(link.id.slot()) {
                continue;
            }
            let mut free = link.ports.iter().filter(|&&n| n != ground);
            if let Some(first) = free.next() {
                for other in free {
                    uf.union(first.slot(), other.slot());
                }
            }
        }

        // Number islands in order of their lowest node.
        let mut root_to_island = vec![None; node_count];
        let mut membership = vec![None; node_count];
        let mut islands: Vec<Island> = Vec::new();
        for node in topology.nodes() {
            if node.id == ground {
                continue;
            }
            let root = uf.find(node.id.slot());
            let island = *root_to_island[root].get_or_insert_with(|| {
                islands.push(Island {
                    nodes: Vec::new(),
                    links: Vec::new(),
                    touches_ground: false,
                });
                islands.len() - 1
            });
            membership[node.id.slot()] = Some(island);
            islands[island].nodes.push(node.id);
        }

        let mut reference_links = Vec::new();
        for link in topology.links() {
            if !is_enabled(link.id.slot()) {
                continue;
            }
            let owner = link
                .ports
                .iter()
                .find(|&&n| n != ground)
                .and_then(|n| membership[n.slot()]);
            match owner {
                Some(island) => {
                    islands[island].links.push(link.id);
                    if link.ports.contains(&ground) {
                        islands[island].touches_ground = true;
                    }
                }
                None => reference_links.push(link.id),
            }
        }

        debug!(
            islands = islands.len(),
            reference_links = reference_links.len(),
            "computed islands"
        );

        Self {
            membership,
            islands,
            reference_links,
        }
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    /// Island of a node; `None` for ground or unknown nodes.
    pub fn island_of(&self, node: NodeId) -> Option<usize> {
        self.membership.get(node.slot()).copied().flatten()
    }

    /// Enabled links whose ports are all on ground.
    pub fn reference_links(&self) -> &[LinkId] {
        &self.reference_links
    }
}
