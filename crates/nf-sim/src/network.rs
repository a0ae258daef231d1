//! Caller-facing network handle.

use nf_core::{LinkId, NodeId};
use nf_graph::{IslandSet, Topology};
use nf_links::{Link, LinkResult, LinkState};
use nf_solver::{NetworkSolver, NodeState, StepReport};
use tracing::debug;

use crate::checkpoint::Checkpoint;
use crate::error::{SimError, SimResult};
use crate::spotter::{NetworkView, Spotter};

/// An initialized network ready to step.
pub struct Network {
    solver: NetworkSolver,
    spotters: Vec<Box<dyn Spotter>>,
    time: f64,
    steps: u64,
}

impl Network {
    pub(crate) fn new(solver: NetworkSolver, spotters: Vec<Box<dyn Spotter>>) -> Self {
        Self {
            solver,
            spotters,
            time: 0.0,
            steps: 0,
        }
    }

    /// Run one major step of length `dt`.
    ///
    /// Spotters see the network before and after the solve. A rejected `dt`
    /// does not advance time.
    pub fn step(&mut self, dt: f64) -> StepReport {
        let view = NetworkView::new(&self.solver, self.time);
        for spotter in &mut self.spotters {
            spotter.pre_step(&view, dt);
        }

        let report = self.solver.step(dt);
        if report.error.is_none() {
            self.time += dt;
            self.steps += 1;
        }
        debug!(
            step = self.steps,
            t = self.time,
            status = ?report.status,
            minor_steps = report.minor_steps,
            "major step"
        );

        let view = NetworkView::new(&self.solver, self.time);
        for spotter in &mut self.spotters {
            spotter.post_step(&view, &report, dt);
        }
        report
    }

    /// Simulation time accumulated over accepted steps.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn topology(&self) -> &Topology {
        self.solver.topology()
    }

    pub fn solver(&self) -> &NetworkSolver {
        &self.solver
    }

    pub fn view(&self) -> NetworkView<'_> {
        NetworkView::new(&self.solver, self.time)
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.topology().node_by_name(name)
    }

    pub fn link_id(&self, name: &str) -> Option<LinkId> {
        self.topology().link_by_name(name)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeState> {
        self.solver.node(id)
    }

    pub fn potential(&self, id: NodeId) -> Option<f64> {
        self.solver.potential(id)
    }

    pub fn potential_by_name(&self, name: &str) -> Option<f64> {
        self.node_id(name).and_then(|id| self.potential(id))
    }

    pub fn link(&self, id: LinkId) -> Option<&dyn Link> {
        self.solver.link(id)
    }

    /// Typed read access to a link.
    pub fn link_as<T: Link>(&self, id: LinkId) -> Option<&T> {
        self.solver.link(id)?.as_any().downcast_ref::<T>()
    }

    /// Typed mutable access to a link; it re-contributes on the next step.
    pub fn link_mut<T: Link>(&mut self, id: LinkId) -> Option<&mut T> {
        self.solver.link_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn flux(&self, id: LinkId) -> Option<f64> {
        self.link(id).map(|l| l.flux())
    }

    /// Overwrite a node potential between steps, e.g. for an initial
    /// condition. Ground keeps its fixed potential.
    pub fn set_potential_by_name(&mut self, name: &str, potential: f64) -> SimResult<()> {
        let id = self.node_id(name).ok_or_else(|| SimError::UnknownNode {
            name: name.to_string(),
        })?;
        if !potential.is_finite() {
            return Err(SimError::InvalidArg {
                what: "potential must be finite",
            });
        }
        if !self.solver.set_potential(id, potential) {
            return Err(SimError::InvalidArg {
                what: "ground potential is fixed",
            });
        }
        Ok(())
    }

    /// Enable or disable a link; the islands are recomputed on the next step.
    pub fn set_link_enabled(&mut self, id: LinkId, enabled: bool) -> SimResult<()> {
        self.solver
            .set_link_enabled(id, enabled)
            .ok_or_else(|| SimError::UnknownLink {
                name: id.to_string(),
            })
    }

    pub fn set_link_enabled_by_name(&mut self, name: &str, enabled: bool) -> SimResult<()> {
        let id = self.link_id(name).ok_or_else(|| SimError::UnknownLink {
            name: name.to_string(),
        })?;
        self.set_link_enabled(id, enabled)
    }

    pub fn islands(&mut self) -> &IslandSet {
        self.solver.islands()
    }

    /// Typed access to a spotter by the index `add_spotter` returned.
    pub fn spotter<S: Spotter>(&self, index: usize) -> Option<&S> {
        self.spotters.get(index)?.as_any().downcast_ref::<S>()
    }

    pub fn spotter_count(&self) -> usize {
        self.spotters.len()
    }

    /// Snapshot everything needed to resume from this point.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            time: self.time,
            steps: self.steps,
            potentials: self.solver.nodes().iter().map(|n| n.potential).collect(),
            enabled: self.solver.slots().iter().map(|s| s.enabled).collect(),
            links: self.solver.link_states(),
        }
    }

    /// Restore a checkpoint taken from a network with the same layout.
    ///
    /// Only valid between major steps. Ground keeps its own potential.
    pub fn restore(&mut self, checkpoint: &Checkpoint) -> SimResult<()> {
        let nodes = self.solver.nodes().len();
        let links = self.solver.slots().len();
        if checkpoint.potentials.len() != nodes {
            return Err(SimError::Checkpoint {
                what: format!("{} potentials for {} nodes", checkpoint.potentials.len(), nodes),
            });
        }
        if checkpoint.enabled.len() != links || checkpoint.links.len() != links {
            return Err(SimError::Checkpoint {
                what: format!(
                    "{} enable flags and {} link states for {} links",
                    checkpoint.enabled.len(),
                    checkpoint.links.len(),
                    links
                ),
            });
        }

        let previous = self.solver.link_states();
        if let Err(err) = self.restore_links(&checkpoint.links) {
            // States saved from the links themselves always restore.
            let _ = self.restore_links(&previous);
            return Err(err.into());
        }
        for (index, &enabled) in checkpoint.enabled.iter().enumerate() {
            self.solver.set_link_enabled(LinkId::from_usize(index), enabled);
        }
        for (index, &potential) in checkpoint.potentials.iter().enumerate() {
            // refused for ground
            self.solver.set_potential(NodeId::from_usize(index), potential);
        }
        self.time = checkpoint.time;
        self.steps = checkpoint.steps;
        self.solver.reset_health();
        Ok(())
    }

    fn restore_links(&mut self, states: &[LinkState]) -> LinkResult<()> {
        for (index, state) in states.iter().enumerate() {
            if let Some(link) = self.solver.link_mut(LinkId::from_usize(index)) {
                link.restore_state(state)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("solver", &self.solver)
            .field("spotters", &self.spotters.len())
            .field("time", &self.time)
            .finish()
    }
}
