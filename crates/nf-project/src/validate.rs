//! Network file validation.
//!
//! Structural checks only: names, references and tables. Link parameters,
//! solver settings and island references are checked when the network is
//! built, by the same code that checks hand-built networks.

use crate::schema::{LinkKind, NetworkDef, SpotterKind};
use nf_core::LinearTable;
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

/// Every problem found in one network file.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{} validation error(s): {}", .0.len(), join(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn validate_network(def: &NetworkDef) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if def.version == 0 || def.version > LATEST_VERSION {
        errors.push(ValidationError::UnsupportedVersion {
            version: def.version,
        });
    }

    let mut node_names: HashSet<&str> = HashSet::new();
    node_names.insert(def.ground.name.as_str());
    for node in &def.nodes {
        if !node_names.insert(node.name.as_str()) {
            errors.push(ValidationError::DuplicateId {
                id: node.name.clone(),
                context: "nodes".to_string(),
            });
        }
        if !node.capacitance.is_finite() || node.capacitance < 0.0 {
            errors.push(invalid(
                format!("nodes.{}.capacitance", node.name),
                node.capacitance,
                "must be finite and non-negative",
            ));
        }
        if !node.potential.is_finite() {
            errors.push(invalid(
                format!("nodes.{}.potential", node.name),
                node.potential,
                "must be finite",
            ));
        }
    }
    if !def.ground.potential.is_finite() {
        errors.push(invalid(
            "ground.potential".to_string(),
            def.ground.potential,
            "must be finite",
        ));
    }

    let mut table_ids: HashSet<&str> = HashSet::new();
    for table in &def.tables {
        if !table_ids.insert(table.id.as_str()) {
            errors.push(ValidationError::DuplicateId {
                id: table.id.clone(),
                context: "tables".to_string(),
            });
        }
        if let Err(err) = LinearTable::from_points(table.x.clone(), table.y.clone()) {
            errors.push(ValidationError::InvalidValue {
                field: format!("tables.{}", table.id),
                value: format!("{} point(s)", table.x.len()),
                reason: err.to_string(),
            });
        }
    }

    let mut link_names: HashSet<&str> = HashSet::new();
    for link in &def.links {
        if !link_names.insert(link.name.as_str()) {
            errors.push(ValidationError::DuplicateId {
                id: link.name.clone(),
                context: "links".to_string(),
            });
        }

        let expected = link.kind.port_count();
        if link.ports.len() != expected {
            errors.push(ValidationError::InvalidValue {
                field: format!("links.{}.ports", link.name),
                value: link.ports.len().to_string(),
                reason: format!("{} links take {} ports", link.kind.type_name(), expected),
            });
        }
        for port in &link.ports {
            if !node_names.contains(port.as_str()) {
                errors.push(ValidationError::MissingReference {
                    id: port.clone(),
                    context: format!("links.{}.ports", link.name),
                });
            }
        }

        if let LinkKind::Battery { voc_table, .. } = &link.kind {
            if !table_ids.contains(voc_table.as_str()) {
                errors.push(ValidationError::MissingReference {
                    id: voc_table.clone(),
                    context: format!("links.{}.voc_table", link.name),
                });
            }
        }
    }

    let mut spotter_names: HashSet<&str> = HashSet::new();
    for spotter in &def.spotters {
        if !spotter_names.insert(spotter.name.as_str()) {
            errors.push(ValidationError::DuplicateId {
                id: spotter.name.clone(),
                context: "spotters".to_string(),
            });
        }
        let (target, known, min, max) = match &spotter.kind {
            SpotterKind::PotentialSensor { node, min, max } => {
                (node, node_names.contains(node.as_str()), *min, *max)
            }
            SpotterKind::FluxSensor { link, min, max } => {
                (link, link_names.contains(link.as_str()), *min, *max)
            }
        };
        if !known {
            errors.push(ValidationError::MissingReference {
                id: target.clone(),
                context: format!("spotters.{}", spotter.name),
            });
        }
        if !(min <= max) {
            errors.push(ValidationError::InvalidValue {
                field: format!("spotters.{}.range", spotter.name),
                value: format!("[{}, {}]", min, max),
                reason: "min must not exceed max".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

fn invalid(field: String, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
