//! Network composition.

use nf_core::{LinkId, NodeId};
use nf_graph::{IslandSet, TopologyBuilder};
use nf_links::{Contribution, Link};
use nf_solver::assembly::{grounds_admittance, island_has_reference};
use nf_solver::{NetworkSolver, NodeState, SolverConfig};
use tracing::info;

use crate::error::{ConfigurationError, InitializationError};
use crate::network::Network;
use crate::spotter::Spotter;

/// Collects nodes, links and spotters, then validates everything at once.
#[derive(Default)]
pub struct NetworkBuilder {
    topology: TopologyBuilder,
    links: Vec<(Box<dyn Link>, Vec<NodeId>)>,
    spotters: Vec<Box<dyn Spotter>>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.topology.add_node(name)
    }

    pub fn add_node_with(
        &mut self,
        name: impl Into<String>,
        potential: f64,
        capacitance: f64,
    ) -> NodeId {
        self.topology.add_node_with(name, potential, capacitance)
    }

    pub fn add_ground(&mut self, name: impl Into<String>, potential: f64) -> NodeId {
        self.topology.add_ground(name, potential)
    }

    /// Add a link bound to `ports` in order. The binding takes the link's name.
    pub fn add_link<L: Link>(&mut self, link: L, ports: &[NodeId]) -> LinkId {
        self.add_boxed_link(Box::new(link), ports)
    }

    pub fn add_boxed_link(&mut self, link: Box<dyn Link>, ports: &[NodeId]) -> LinkId {
        let id = self.topology.add_link(link.name(), ports);
        self.links.push((link, ports.to_vec()));
        id
    }

    /// Add a spotter; returns its index for later lookup.
    pub fn add_spotter<S: Spotter>(&mut self, spotter: S) -> usize {
        self.spotters.push(Box::new(spotter));
        self.spotters.len() - 1
    }

    /// Validate everything and create the network.
    ///
    /// Graph problems, link parameter problems, port count mismatches, solver
    /// configuration problems and islands without a reference are all
    /// collected before returning.
    pub fn build(mut self, config: SolverConfig) -> Result<Network, InitializationError> {
        let mut problems: Vec<ConfigurationError> = Vec::new();

        let topology = match self.topology.build() {
            Ok(t) => Some(t),
            Err(errs) => {
                problems.extend(errs.0.into_iter().map(ConfigurationError::from));
                None
            }
        };

        for (link, ports) in &self.links {
            if let Err(err) = link.validate() {
                problems.push(err.into());
            }
            if link.port_count() != ports.len() {
                problems.push(ConfigurationError::PortCount {
                    link: link.name().to_string(),
                    expected: link.port_count(),
                    actual: ports.len(),
                });
            }
        }

        if let Err(errs) = config.validate() {
            problems.extend(errs.into_iter().map(ConfigurationError::from));
        }

        if let Some(topology) = &topology {
            let ground = topology.ground();
            let grounded: Vec<bool> = self
                .links
                .iter_mut()
                .map(|(link, ports)| stamps_ground_admittance(link.as_mut(), ports, ground))
                .collect();
            let nodes: Vec<NodeState> = topology.nodes().iter().map(NodeState::from_node).collect();
            let islands = IslandSet::compute(topology, &[]);
            for (index, island) in islands.islands().iter().enumerate() {
                if island.is_idle() || island_has_reference(island, &nodes, &grounded) {
                    continue;
                }
                let node = island
                    .nodes
                    .first()
                    .and_then(|n| topology.node(*n))
                    .map(|n| n.name.clone())
                    .unwrap_or_default();
                problems.push(ConfigurationError::MissingReference {
                    island: index,
                    node,
                });
            }
        }

        let topology = match topology {
            Some(t) if problems.is_empty() => t,
            _ => return Err(InitializationError { problems }),
        };

        let links = self.links.into_iter().map(|(link, _)| link).collect();
        let solver = NetworkSolver::new(topology, links, config).map_err(|err| {
            InitializationError {
                problems: vec![err.into()],
            }
        })?;

        info!(
            nodes = solver.topology().node_count(),
            links = solver.topology().link_count(),
            "network initialized"
        );
        Ok(Network::new(solver, self.spotters))
    }
}

/// Whether `link` puts admittance on one of its ground ports.
///
/// The link is pre-stepped with a unit `dt` so admittance that scales with
/// the step (capacitors) is seen; the first real step recomputes it.
fn stamps_ground_admittance(link: &mut dyn Link, ports: &[NodeId], ground: NodeId) -> bool {
    if !ports.contains(&ground) || link.port_count() != ports.len() {
        return false;
    }
    link.step(1.0);
    let mut contribution = Contribution::zeros(ports.len());
    link.contribute(&mut contribution);
    contribution.is_finite() && grounds_admittance(ports, ground, &contribution)
}
