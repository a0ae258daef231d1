//! Incremental topology builder.

use nf_core::{LinkId, NodeId, Real};

use crate::error::{GraphError, GraphErrors};
use crate::graph::{LinkBinding, Node, NodeKind, Topology};
use crate::validate;

/// Builder for constructing a topology incrementally.
///
/// Add nodes, the ground node and link bindings, then call `build()` to
/// validate and freeze everything into an immutable `Topology`. Validation
/// reports every problem it finds, not just the first.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    nodes: Vec<Node>,
    links: Vec<LinkBinding>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a free node at zero potential with no capacitance.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.add_node_with(name, 0.0, 0.0)
    }

    /// Add a free node with an initial potential and capacitance.
    pub fn add_node_with(
        &mut self,
        name: impl Into<String>,
        potential: Real,
        capacitance: Real,
    ) -> NodeId {
        self.push_node(name.into(), NodeKind::Normal, potential, capacitance)
    }

    /// Add the reference node held at `potential`.
    pub fn add_ground(&mut self, name: impl Into<String>, potential: Real) -> NodeId {
        self.push_node(name.into(), NodeKind::Ground, potential, 0.0)
    }

    fn push_node(&mut self, name: String, kind: NodeKind, potential: Real, capacitance: Real) -> NodeId {
        let id = NodeId::from_usize(self.nodes.len());
        self.nodes.push(Node {
            id,
            name,
            kind,
            potential,
            capacitance,
        });
        id
    }

    /// Bind a link to its ordered ports. Returns the link id.
    pub fn add_link(&mut self, name: impl Into<String>, ports: &[NodeId]) -> LinkId {
        let id = LinkId::from_usize(self.links.len());
        self.links.push(LinkBinding {
            id,
            name: name.into(),
            ports: ports.to_vec(),
        });
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Validate and build the topology.
    pub fn build(self) -> Result<Topology, GraphErrors> {
        let errors = validate::validate_topology(&self.nodes, &self.links);
        if !errors.is_empty() {
            return Err(GraphErrors(errors));
        }

        let ground = self
            .nodes
            .iter()
            .find(|n| n.is_ground())
            .map(|n| n.id)
            .ok_or(GraphError::MissingGround)?;

        let (node_link_offsets, node_links) = Self::build_adjacency(&self.nodes, &self.links);

        Ok(Topology {
            nodes: self.nodes,
            links: self.links,
            ground,
            node_link_offsets,
            node_links,
        })
    }

    /// Build CSR node -> links adjacency. A link bound twice to the same node
    /// is listed once.
    fn build_adjacency(nodes: &[Node], links: &[LinkBinding]) -> (Vec<usize>, Vec<LinkId>) {
        let mut per_node: Vec<Vec<LinkId>> = vec![Vec::new(); nodes.len()];
        for link in links {
            for node in &link.ports {
                let list = &mut per_node[node.slot()];
                if list.last() != Some(&link.id) {
                    list.push(link.id);
                }
            }
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::new();
        offsets.push(0);
        for list in per_node {
            flat.extend(list);
            offsets.push(flat.len());
        }
        (offsets, flat)
    }
}
