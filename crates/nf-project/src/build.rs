//! Turn a validated network file into a runnable `Network`.

use crate::schema::{LinkKind, NetworkDef, SpotterKind};
use crate::{ProjectError, ProjectResult};
use nf_core::{LinearTable, LinkId, NodeId};
use nf_links::{
    Battery, Capacitor, Conductor, ConstantPowerLoad, Diode, FluxSource, Link, Potential,
};
use nf_sim::{FluxSensor, Network, NetworkBuilder, PotentialSensor};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Build a network from a definition.
///
/// Nodes keep file order and the ground node is added last. Links declared
/// with `enabled: false` are bound and then disabled before the first step.
pub fn build_network(def: &NetworkDef) -> ProjectResult<Network> {
    crate::validate::validate_network(def)?;

    let mut tables: HashMap<&str, Arc<LinearTable>> = HashMap::new();
    for table in &def.tables {
        let t = LinearTable::from_points(table.x.clone(), table.y.clone()).map_err(|err| {
            ProjectError::Build {
                what: format!("table '{}': {}", table.id, err),
            }
        })?;
        tables.insert(table.id.as_str(), Arc::new(t));
    }

    let mut builder = NetworkBuilder::new();
    let mut nodes: HashMap<&str, NodeId> = HashMap::new();
    for node in &def.nodes {
        let id = builder.add_node_with(node.name.clone(), node.potential, node.capacitance);
        nodes.insert(node.name.as_str(), id);
    }
    let ground = builder.add_ground(def.ground.name.clone(), def.ground.potential);
    nodes.insert(def.ground.name.as_str(), ground);

    let mut links: HashMap<&str, LinkId> = HashMap::new();
    let mut disabled = Vec::new();
    for link in &def.links {
        let ports: Vec<NodeId> = link
            .ports
            .iter()
            .map(|p| lookup(&nodes, p, "node"))
            .collect::<ProjectResult<_>>()?;
        let object = make_link(&link.name, &link.kind, &tables)?;
        let id = builder.add_boxed_link(object, &ports);
        links.insert(link.name.as_str(), id);
        if !link.enabled {
            disabled.push(id);
        }
    }

    for spotter in &def.spotters {
        match &spotter.kind {
            SpotterKind::PotentialSensor { node, min, max } => {
                let node = lookup(&nodes, node, "node")?;
                builder.add_spotter(PotentialSensor::new(spotter.name.clone(), node, *min, *max));
            }
            SpotterKind::FluxSensor { link, min, max } => {
                let link = lookup(&links, link, "link")?;
                builder.add_spotter(FluxSensor::new(spotter.name.clone(), link, *min, *max));
            }
        }
    }

    let mut network = builder.build(def.solver.clone())?;
    for id in disabled {
        network.set_link_enabled(id, false)?;
    }
    debug!(network = %def.name, "network built from definition");
    Ok(network)
}

fn lookup<T: Copy>(map: &HashMap<&str, T>, name: &str, what: &str) -> ProjectResult<T> {
    map.get(name).copied().ok_or_else(|| ProjectError::Build {
        what: format!("unknown {} '{}'", what, name),
    })
}

fn make_link(
    name: &str,
    kind: &LinkKind,
    tables: &HashMap<&str, Arc<LinearTable>>,
) -> ProjectResult<Box<dyn Link>> {
    let link: Box<dyn Link> = match kind {
        LinkKind::Conductor {
            conductance,
            blockage,
        } => {
            let mut c = Conductor::new(name, *conductance);
            if let Some(fraction) = blockage {
                c.set_blockage(*fraction);
            }
            Box::new(c)
        }
        LinkKind::Potential {
            conductance,
            source_potential,
        } => Box::new(Potential::new(name, *conductance, *source_potential)),
        LinkKind::FluxSource { flux } => Box::new(FluxSource::new(name, *flux)),
        LinkKind::Capacitor {
            capacitance,
            initial_drop,
        } => Box::new(Capacitor::new(name, *capacitance, *initial_drop)),
        LinkKind::Diode {
            forward_conductance,
            reverse_conductance,
        } => Box::new(Diode::new(name, *forward_conductance, *reverse_conductance)),
        LinkKind::ConstantPowerLoad {
            power,
            expected_potential,
        } => {
            let load = ConstantPowerLoad::new(name, *power);
            match expected_potential {
                Some(v) => Box::new(load.with_expected_potential(*v)),
                None => Box::new(load),
            }
        }
        LinkKind::Battery {
            cells,
            cell_resistance,
            max_capacity,
            soc,
            voc_table,
            open_circuit,
        } => {
            let table = lookup_table(tables, voc_table)?;
            let mut battery =
                Battery::new(name, *cells, *cell_resistance, *max_capacity, *soc, table);
            battery.open_circuit = *open_circuit;
            Box::new(battery)
        }
    };
    Ok(link)
}

fn lookup_table(
    tables: &HashMap<&str, Arc<LinearTable>>,
    id: &str,
) -> ProjectResult<Arc<LinearTable>> {
    tables.get(id).cloned().ok_or_else(|| ProjectError::Build {
        what: format!("unknown table '{}'", id),
    })
}
