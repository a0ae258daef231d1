//! Network file schema.

use nf_solver::SolverConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub solver: SolverConfig,
    pub ground: GroundDef,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub tables: Vec<TableDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
    #[serde(default)]
    pub spotters: Vec<SpotterDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroundDef {
    pub name: String,
    #[serde(default)]
    pub potential: f64,
}

impl Default for GroundDef {
    fn default() -> Self {
        Self {
            name: "GROUND".to_string(),
            potential: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub name: String,
    #[serde(default)]
    pub potential: f64,
    /// Zero for a plain junction.
    #[serde(default)]
    pub capacitance: f64,
}

/// Named piecewise-linear table, referenced from links by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDef {
    pub id: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDef {
    pub name: String,
    /// Node names, in port order. The ground node is referenced by its name.
    pub ports: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub kind: LinkKind,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum LinkKind {
    Conductor {
        conductance: f64,
        /// Blockage fraction; the malfunction is active when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        blockage: Option<f64>,
    },
    Potential {
        conductance: f64,
        source_potential: f64,
    },
    FluxSource {
        flux: f64,
    },
    Capacitor {
        capacitance: f64,
        #[serde(default)]
        initial_drop: f64,
    },
    Diode {
        forward_conductance: f64,
        reverse_conductance: f64,
    },
    ConstantPowerLoad {
        power: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_potential: Option<f64>,
    },
    Battery {
        cells: usize,
        cell_resistance: f64,
        max_capacity: f64,
        soc: f64,
        /// Id of the table mapping state of charge to cell open-circuit potential.
        voc_table: String,
        #[serde(default)]
        open_circuit: bool,
    },
}

impl LinkKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            LinkKind::Conductor { .. } => "Conductor",
            LinkKind::Potential { .. } => "Potential",
            LinkKind::FluxSource { .. } => "FluxSource",
            LinkKind::Capacitor { .. } => "Capacitor",
            LinkKind::Diode { .. } => "Diode",
            LinkKind::ConstantPowerLoad { .. } => "ConstantPowerLoad",
            LinkKind::Battery { .. } => "Battery",
        }
    }

    /// Every provided link kind is a two-port link.
    pub fn port_count(&self) -> usize {
        2
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpotterDef {
    pub name: String,
    pub kind: SpotterKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SpotterKind {
    PotentialSensor { node: String, min: f64, max: f64 },
    FluxSensor { link: String, min: f64, max: f64 },
}
