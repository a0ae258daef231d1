//! Runtime node state.

use nf_graph::Node;

/// Potential and flow bookkeeping for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub potential: f64,
    /// Capacitance to the reference (>= 0)
    pub capacitance: f64,
    /// Flow into the node during the last major step
    pub influx: f64,
    /// Flow out of the node during the last major step
    pub outflux: f64,
    previous: f64,
}

impl NodeState {
    pub fn new(potential: f64, capacitance: f64) -> Self {
        Self {
            potential,
            capacitance,
            influx: 0.0,
            outflux: 0.0,
            previous: potential,
        }
    }

    pub fn from_node(node: &Node) -> Self {
        Self::new(node.potential, node.capacitance)
    }

    pub fn net_flux(&self) -> f64 {
        self.influx - self.outflux
    }

    /// Potential at the start of the current major step.
    pub fn previous_potential(&self) -> f64 {
        self.previous
    }

    /// Start a major step: clear flows and remember the potential.
    pub fn begin_step(&mut self) {
        self.influx = 0.0;
        self.outflux = 0.0;
        self.previous = self.potential;
    }

    /// Put the potential back to its start-of-step value.
    pub fn restore(&mut self) {
        self.potential = self.previous;
    }

    /// Add one port flow (positive = into the node).
    pub fn accumulate(&mut self, flow: f64) {
        if flow >= 0.0 {
            self.influx += flow;
        } else {
            self.outflux -= flow;
        }
    }

    /// `C/dt` admittance of the node capacitance, zero when inactive.
    pub fn capacitive_admittance(&self, dt: f64) -> f64 {
        if self.capacitance > 0.0 && dt > 0.0 {
            self.capacitance / dt
        } else {
            0.0
        }
    }
}
