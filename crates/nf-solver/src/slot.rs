//! Link slots: a link object plus the solver's bookkeeping for it.

use nf_core::{LinkId, NodeId};
use nf_links::{Contribution, Link, MinorStep};

use crate::node::NodeState;

/// A link bound to its ports, with cached contribution and flows.
pub struct LinkSlot {
    pub id: LinkId,
    pub ports: Vec<NodeId>,
    pub enabled: bool,
    /// Contribution must be refreshed before the next assembly.
    pub dirty: bool,
    link: Box<dyn Link>,
    contribution: Contribution,
    flows: Vec<f64>,
    port_potentials: Vec<f64>,
}

impl LinkSlot {
    pub fn new(id: LinkId, ports: Vec<NodeId>, link: Box<dyn Link>) -> Self {
        let n = ports.len();
        Self {
            id,
            ports,
            enabled: true,
            dirty: true,
            link,
            contribution: Contribution::zeros(n),
            flows: vec![0.0; n],
            port_potentials: vec![0.0; n],
        }
    }

    pub fn link(&self) -> &dyn Link {
        &*self.link
    }

    /// Mutable access marks the contribution dirty.
    pub fn link_mut(&mut self) -> &mut dyn Link {
        self.dirty = true;
        &mut *self.link
    }

    pub fn contribution(&self) -> &Contribution {
        &self.contribution
    }

    /// Per-port flows from the last `compute_flows` (positive into node).
    pub fn flows(&self) -> &[f64] {
        &self.flows
    }

    /// Start-of-major-step hook.
    pub fn step(&mut self, dt: f64) {
        if self.link.step(dt) {
            self.dirty = true;
        }
    }

    /// Re-stamp the cached contribution.
    pub fn refresh(&mut self) {
        self.contribution.clear();
        self.link.contribute(&mut self.contribution);
        self.dirty = false;
    }

    /// Hand solved potentials to the link; returns whether it changed.
    /// Linear links are not consulted.
    pub fn update(&mut self, nodes: &[NodeState], ctx: &MinorStep) -> bool {
        if !self.link.is_nonlinear() {
            return false;
        }
        self.gather(nodes);
        let changed = self
            .link
            .update_from_potentials(&self.port_potentials, ctx);
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Compute final flows and add them to the port nodes.
    pub fn compute_flows(&mut self, nodes: &mut [NodeState], dt: f64) {
        self.gather(nodes);
        self.flows.iter_mut().for_each(|f| *f = 0.0);
        self.link
            .compute_flows(&self.port_potentials, dt, &mut self.flows);
        for (port, &flow) in self.ports.iter().zip(&self.flows) {
            nodes[port.slot()].accumulate(flow);
        }
    }

    /// Zero the reported flows (disabled or failed links).
    pub fn clear_flows(&mut self) {
        self.flows.iter_mut().for_each(|f| *f = 0.0);
    }

    fn gather(&mut self, nodes: &[NodeState]) {
        for (p, port) in self.port_potentials.iter_mut().zip(&self.ports) {
            *p = nodes[port.slot()].potential;
        }
    }
}

impl std::fmt::Debug for LinkSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkSlot")
            .field("id", &self.id)
            .field("name", &self.link.name())
            .field("ports", &self.ports)
            .field("enabled", &self.enabled)
            .field("dirty", &self.dirty)
            .finish()
    }
}
