//! Core topology data structures.

use nf_core::{LinkId, NodeId, Real};

/// Role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Free node whose potential is solved for.
    Normal,
    /// Reference node with an externally fixed potential.
    Ground,
}

/// A node definition: identity plus initial state handed to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// Initial potential (the fixed potential for Ground).
    pub potential: Real,
    /// Capacitance to the reference, 0 for none.
    pub capacitance: Real,
}

impl Node {
    pub fn is_ground(&self) -> bool {
        self.kind == NodeKind::Ground
    }
}

/// Binding of a link to its ordered ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBinding {
    pub id: LinkId,
    pub name: String,
    pub ports: Vec<NodeId>,
}

/// A validated, immutable network topology.
///
/// Nodes and links are stored densely by id. Node-to-link adjacency is kept
/// in CSR form: node i's links are `node_links[node_link_offsets[i]..node_link_offsets[i+1]]`.
#[derive(Debug, Clone)]
pub struct Topology {
    pub(crate) nodes: Vec<Node>,
    pub(crate) links: Vec<LinkBinding>,
    pub(crate) ground: NodeId,
    pub(crate) node_link_offsets: Vec<usize>,
    pub(crate) node_links: Vec<LinkId>,
}

impl Topology {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkBinding] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// The ground (reference) node.
    pub fn ground(&self) -> NodeId {
        self.ground
    }

    pub fn is_ground(&self, id: NodeId) -> bool {
        id == self.ground
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    pub fn link(&self, id: LinkId) -> Option<&LinkBinding> {
        self.links.get(id.slot())
    }

    /// Ports of a link (empty if the id is unknown).
    pub fn link_ports(&self, id: LinkId) -> &[NodeId] {
        self.links
            .get(id.slot())
            .map(|l| l.ports.as_slice())
            .unwrap_or(&[])
    }

    /// Links touching a node, in link order, each listed once.
    pub fn node_links(&self, id: NodeId) -> &[LinkId] {
        let idx = id.slot();
        if idx >= self.nodes.len() {
            return &[];
        }
        &self.node_links[self.node_link_offsets[idx]..self.node_link_offsets[idx + 1]]
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    pub fn link_by_name(&self, name: &str) -> Option<LinkId> {
        self.links.iter().find(|l| l.name == name).map(|l| l.id)
    }
}
