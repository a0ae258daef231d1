//! Observers that read the network around each major step.

use std::any::Any;

use nf_core::{LinkId, NodeId};
use nf_graph::Topology;
use nf_links::Link;
use nf_solver::{NetworkSolver, NodeState, StepReport};

/// Read-only view of a network handed to spotters.
#[derive(Clone, Copy)]
pub struct NetworkView<'a> {
    solver: &'a NetworkSolver,
    time: f64,
}

impl<'a> NetworkView<'a> {
    pub(crate) fn new(solver: &'a NetworkSolver, time: f64) -> Self {
        Self { solver, time }
    }

    /// Simulation time at the start of the step being observed.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn topology(&self) -> &'a Topology {
        self.solver.topology()
    }

    pub fn node(&self, id: NodeId) -> Option<&'a NodeState> {
        self.solver.node(id)
    }

    pub fn potential(&self, id: NodeId) -> Option<f64> {
        self.solver.potential(id)
    }

    pub fn potential_by_name(&self, name: &str) -> Option<f64> {
        self.topology()
            .node_by_name(name)
            .and_then(|id| self.potential(id))
    }

    pub fn link(&self, id: LinkId) -> Option<&'a dyn Link> {
        self.solver.link(id)
    }

    pub fn flux(&self, id: LinkId) -> Option<f64> {
        self.link(id).map(|l| l.flux())
    }
}

/// Something that watches the network each major step.
pub trait Spotter: Send + Any {
    fn name(&self) -> &str;

    /// Called before the solver runs.
    fn pre_step(&mut self, _view: &NetworkView<'_>, _dt: f64) {}

    /// Called after every island finished.
    fn post_step(&mut self, view: &NetworkView<'_>, report: &StepReport, dt: f64);

    fn as_any(&self) -> &dyn Any;
}

/// Clamped reading shared by the sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Reads a node potential, clamped to a sensor range.
#[derive(Debug, Clone)]
pub struct PotentialSensor {
    name: String,
    node: NodeId,
    range: Range,
    reading: Option<f64>,
}

impl PotentialSensor {
    pub fn new(name: impl Into<String>, node: NodeId, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            node,
            range: Range::new(min, max),
            reading: None,
        }
    }

    /// Last reading, `None` before the first step.
    pub fn reading(&self) -> Option<f64> {
        self.reading
    }
}

impl Spotter for PotentialSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn post_step(&mut self, view: &NetworkView<'_>, _report: &StepReport, _dt: f64) {
        self.reading = view.potential(self.node).map(|v| self.range.clamp(v));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads a link flux, clamped to a sensor range.
#[derive(Debug, Clone)]
pub struct FluxSensor {
    name: String,
    link: LinkId,
    range: Range,
    reading: Option<f64>,
}

impl FluxSensor {
    pub fn new(name: impl Into<String>, link: LinkId, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            link,
            range: Range::new(min, max),
            reading: None,
        }
    }

    pub fn reading(&self) -> Option<f64> {
        self.reading
    }
}

impl Spotter for FluxSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn post_step(&mut self, view: &NetworkView<'_>, _report: &StepReport, _dt: f64) {
        self.reading = view.flux(self.link).map(|v| self.range.clamp(v));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
