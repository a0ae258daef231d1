//! Major step driver.

use nalgebra::DVector;
use nf_core::{LinkId, NodeId};
use nf_graph::{IslandSet, Topology};
use nf_links::{Link, LinkState, MinorStep};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::assembly::IslandSystem;
use crate::config::{AssemblyMode, SolverConfig};
use crate::controller::ConvergenceController;
use crate::error::{SolverError, SolverResult};
use crate::health::HealthMonitor;
use crate::linear::{LinearError, LinearSolver};
use crate::node::NodeState;
use crate::report::{IslandReport, SolveStatus, StepReport};
use crate::slot::LinkSlot;

/// Solver state for one island, rebuilt whenever the islands change.
struct IslandWork {
    index: usize,
    links: Vec<LinkId>,
    system: IslandSystem,
    linear: LinearSolver,
    controller: ConvergenceController,
    decompositions: usize,
    outcome: Option<Result<DVector<f64>, SolverError>>,
}

impl IslandWork {
    fn is_idle(&self) -> bool {
        self.links.is_empty()
    }

    /// Factor (or reuse) and solve the assembled system.
    fn solve(&mut self, config: &SolverConfig) {
        if self.linear.needs_decomposition(self.system.matrix())
            && self.decompositions >= config.decomposition_limit
        {
            self.outcome = Some(Err(SolverError::DecompositionLimit {
                island: self.index,
                limit: config.decomposition_limit,
            }));
            return;
        }
        let result = self.linear.solve(
            self.system.matrix(),
            self.system.source(),
            config.singular_threshold,
        );
        self.outcome = Some(match result {
            Ok(sol) => {
                if sol.fresh {
                    self.decompositions += 1;
                }
                Ok(sol.x)
            }
            Err(err) => Err(self.linear_error(err)),
        });
    }

    fn linear_error(&self, err: LinearError) -> SolverError {
        match err {
            LinearError::EmptyRow { .. } | LinearError::SmallPivot { .. } => {
                SolverError::SingularMatrix {
                    island: self.index,
                    node: err.row().map(|r| self.system.rows().node(r)),
                }
            }
            LinearError::Shape { .. } | LinearError::NonFinite => SolverError::RuntimeInvariant {
                island: self.index,
                what: err.to_string(),
            },
        }
    }

    fn report(&self) -> IslandReport {
        IslandReport {
            island: self.index,
            nodes: self.system.rows().nodes().to_vec(),
            status: self.controller.status().unwrap_or(SolveStatus::Failed),
            minor_steps: self.controller.minor_steps(),
            decompositions: self.decompositions,
            error: self.controller.error().cloned(),
        }
    }
}

/// Steps a network of nodes and links through time.
///
/// Owns node state and link objects. Island partitioning is recomputed
/// lazily, only after a link was enabled or disabled.
pub struct NetworkSolver {
    config: SolverConfig,
    topology: Topology,
    nodes: Vec<NodeState>,
    slots: Vec<LinkSlot>,
    islands: IslandSet,
    work: Vec<IslandWork>,
    topology_dirty: bool,
    health: HealthMonitor,
}

impl NetworkSolver {
    /// Create a solver. `links[i]` is bound to `topology.links()[i]`.
    pub fn new(
        topology: Topology,
        links: Vec<Box<dyn Link>>,
        config: SolverConfig,
    ) -> SolverResult<Self> {
        if let Err(problems) = config.validate() {
            if let Some(first) = problems.into_iter().next() {
                return Err(first);
            }
        }
        if links.len() != topology.link_count() {
            return Err(SolverError::Configuration {
                field: "links",
                what: format!(
                    "{} link objects for {} link bindings",
                    links.len(),
                    topology.link_count()
                ),
            });
        }

        let nodes = topology.nodes().iter().map(NodeState::from_node).collect();
        let slots = topology
            .links()
            .iter()
            .zip(links)
            .map(|(binding, link)| LinkSlot::new(binding.id, binding.ports.clone(), link))
            .collect();

        let health = HealthMonitor::new(config.health_streak_threshold);
        let mut solver = Self {
            config,
            topology,
            nodes,
            slots,
            islands: IslandSet::default(),
            work: Vec::new(),
            topology_dirty: true,
            health,
        };
        solver.refresh_islands();
        Ok(solver)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn nodes(&self) -> &[NodeState] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeState> {
        self.nodes.get(id.slot())
    }

    pub fn potential(&self, id: NodeId) -> Option<f64> {
        self.node(id).map(|n| n.potential)
    }

    /// Overwrite a node potential between major steps. Ground is refused.
    pub fn set_potential(&mut self, id: NodeId, potential: f64) -> bool {
        if self.topology.is_ground(id) {
            return false;
        }
        match self.nodes.get_mut(id.slot()) {
            Some(n) => {
                n.potential = potential;
                true
            }
            None => false,
        }
    }

    pub fn slots(&self) -> &[LinkSlot] {
        &self.slots
    }

    pub fn link(&self, id: LinkId) -> Option<&dyn Link> {
        self.slots.get(id.slot()).map(|s| s.link())
    }

    /// Mutable link access; the link re-contributes on the next step.
    pub fn link_mut(&mut self, id: LinkId) -> Option<&mut dyn Link> {
        self.slots.get_mut(id.slot()).map(|s| s.link_mut())
    }

    pub fn link_enabled(&self, id: LinkId) -> Option<bool> {
        self.slots.get(id.slot()).map(|s| s.enabled)
    }

    /// Enable or disable a link. Returns `None` for an unknown link.
    pub fn set_link_enabled(&mut self, id: LinkId, enabled: bool) -> Option<()> {
        let slot = self.slots.get_mut(id.slot())?;
        if slot.enabled != enabled {
            slot.enabled = enabled;
            slot.dirty = true;
            if !enabled {
                slot.clear_flows();
            }
            self.topology_dirty = true;
        }
        Some(())
    }

    /// Current island partition (recomputed if links changed).
    pub fn islands(&mut self) -> &IslandSet {
        self.refresh_islands();
        &self.islands
    }

    /// Forget degraded and failed streaks, e.g. after restoring a checkpoint.
    pub fn reset_health(&mut self) {
        self.health.reset();
    }

    pub fn link_states(&self) -> Vec<LinkState> {
        self.slots.iter().map(|s| s.link().save_state()).collect()
    }

    /// Rebuild islands and their solver state if the topology changed.
    fn refresh_islands(&mut self) {
        if !self.topology_dirty {
            return;
        }
        let enabled: Vec<bool> = self.slots.iter().map(|s| s.enabled).collect();
        self.islands = IslandSet::compute(&self.topology, &enabled);
        self.work = self
            .islands
            .islands()
            .iter()
            .enumerate()
            .map(|(index, island)| IslandWork {
                index,
                links: island.links.clone(),
                system: IslandSystem::for_island(island),
                linear: LinearSolver::new(),
                controller: ConvergenceController::new(index),
                decompositions: 0,
                outcome: None,
            })
            .collect();
        for slot in &mut self.slots {
            slot.dirty = true;
        }
        self.topology_dirty = false;
        info!(
            islands = self.islands.len(),
            reference_links = self.islands.reference_links().len(),
            "island partition updated"
        );
    }

    /// Advance the network by `dt`.
    ///
    /// Never returns an error: problems are reported through the status of
    /// the affected islands (or of the whole step for a bad `dt`). `dt` must
    /// be positive: capacitive terms scale with `1/dt`.
    pub fn step(&mut self, dt: f64) -> StepReport {
        if !dt.is_finite() || dt <= 0.0 {
            warn!(dt, "rejected time step");
            let mut report = StepReport::failed(SolverError::InvalidTimeStep { dt });
            report.health = self.health.record(report.status);
            return report;
        }

        self.refresh_islands();

        for node in &mut self.nodes {
            node.begin_step();
        }
        for slot in self.slots.iter_mut().filter(|s| s.enabled) {
            slot.step(dt);
        }
        for work in &mut self.work {
            work.decompositions = 0;
            work.outcome = None;
            if work.is_idle() {
                work.controller.settle();
            } else {
                work.controller.begin();
            }
        }

        let mut minor_step = 0;
        while self.work.iter().any(|w| w.controller.is_solving()) {
            minor_step += 1;
            self.minor_step(dt, minor_step);
        }

        self.finish_step(dt);

        let mut report = StepReport::from_islands(self.work.iter().map(IslandWork::report).collect());
        report.health = self.health.record(report.status);
        if report.status != SolveStatus::Converged {
            warn!(
                status = ?report.status,
                minor_steps = report.minor_steps,
                "major step did not converge cleanly"
            );
        }
        report
    }

    fn minor_step(&mut self, dt: f64, minor_step: usize) {
        let full = self.config.assembly == AssemblyMode::Full;

        // Assemble (serial).
        for work in self.work.iter_mut().filter(|w| w.controller.is_solving()) {
            for id in &work.links {
                let slot = &mut self.slots[id.slot()];
                if slot.enabled && (full || slot.dirty) {
                    slot.refresh();
                }
            }
            let slots = work.links.iter().map(|id| &self.slots[id.slot()]);
            if let Err(what) = work.system.assemble(slots, &self.nodes, dt) {
                work.outcome = Some(Err(SolverError::RuntimeInvariant {
                    island: work.index,
                    what,
                }));
            }
        }

        // Solve (parallel across islands when enabled).
        let config = &self.config;
        let solving = self
            .work
            .iter()
            .filter(|w| w.controller.is_solving() && w.outcome.is_none())
            .count();
        if config.parallel_islands && solving > 1 {
            self.work
                .par_iter_mut()
                .filter(|w| w.controller.is_solving() && w.outcome.is_none())
                .for_each(|w| w.solve(config));
        } else {
            self.work
                .iter_mut()
                .filter(|w| w.controller.is_solving() && w.outcome.is_none())
                .for_each(|w| w.solve(config));
        }

        // Update links and advance controllers (serial).
        for work in self.work.iter_mut().filter(|w| w.controller.is_solving()) {
            match work.outcome.take() {
                Some(Ok(x)) => {
                    for (row, value) in x.iter().enumerate() {
                        let node = work.system.rows().node(row);
                        self.nodes[node.slot()].potential = *value;
                    }
                    let ctx = MinorStep {
                        dt,
                        minor_step,
                        tolerance: work.controller.tolerance(&self.config),
                        min_linearization_potential: self.config.min_linearization_potential,
                    };
                    let mut changed = false;
                    for id in &work.links {
                        let slot = &mut self.slots[id.slot()];
                        if slot.enabled {
                            changed |= slot.update(&self.nodes, &ctx);
                        }
                    }
                    work.controller.advance(changed, &self.config);
                    debug!(
                        island = work.index,
                        minor_step,
                        changed,
                        state = ?work.controller.state(),
                        "minor step"
                    );
                }
                Some(Err(SolverError::DecompositionLimit { .. })) => {
                    warn!(island = work.index, "decomposition limit reached");
                    work.controller.decomposition_limit(&self.config);
                }
                Some(Err(err)) => {
                    warn!(island = work.index, error = %err, "island solve failed");
                    work.linear.invalidate();
                    work.controller.fail(err);
                }
                None => {
                    work.controller.fail(SolverError::RuntimeInvariant {
                        island: work.index,
                        what: "island was not solved".to_string(),
                    });
                }
            }
        }
    }

    /// Restore failed islands and compute flows for everything else.
    fn finish_step(&mut self, dt: f64) {
        for work in &self.work {
            let failed = work.controller.status() == Some(SolveStatus::Failed);
            if failed {
                for node in work.system.rows().nodes() {
                    self.nodes[node.slot()].restore();
                }
            }
            for id in &work.links {
                let slot = &mut self.slots[id.slot()];
                if !slot.enabled {
                    continue;
                }
                if failed {
                    slot.clear_flows();
                } else {
                    slot.compute_flows(&mut self.nodes, dt);
                }
            }
        }
        for id in self.islands.reference_links() {
            let slot = &mut self.slots[id.slot()];
            if slot.enabled {
                slot.compute_flows(&mut self.nodes, dt);
            }
        }
    }
}

impl std::fmt::Debug for NetworkSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkSolver")
            .field("nodes", &self.nodes.len())
            .field("links", &self.slots.len())
            .field("islands", &self.islands.len())
            .finish()
    }
}
