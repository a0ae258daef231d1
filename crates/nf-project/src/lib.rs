//! nf-project: network definition files.
//!
//! A network file names its nodes, ground, lookup tables, links and spotters
//! and carries the solver configuration. Files are YAML or JSON and are
//! validated as a whole before anything is built.

pub mod build;
pub mod schema;
pub mod validate;

pub use build::build_network;
pub use schema::*;
pub use validate::{validate_network, ValidationError, ValidationErrors, LATEST_VERSION};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Initialization(#[from] nf_sim::InitializationError),

    #[error("Build error: {what}")]
    Build { what: String },

    #[error(transparent)]
    Sim(#[from] nf_sim::SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_yaml_str(content: &str) -> ProjectResult<NetworkDef> {
    let def: NetworkDef = serde_yaml::from_str(content)?;
    validate_network(&def)?;
    Ok(def)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<NetworkDef> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml_str(&content)
}

pub fn save_yaml(path: &std::path::Path, def: &NetworkDef) -> ProjectResult<()> {
    validate_network(def)?;
    let content = serde_yaml::to_string(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<NetworkDef> {
    let content = std::fs::read_to_string(path)?;
    let def: NetworkDef = serde_json::from_str(&content)?;
    validate_network(&def)?;
    Ok(def)
}

pub fn save_json(path: &std::path::Path, def: &NetworkDef) -> ProjectResult<()> {
    validate_network(def)?;
    let content = serde_json::to_string_pretty(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a file by extension: `.json` as JSON, anything else as YAML.
pub fn load(path: &std::path::Path) -> ProjectResult<NetworkDef> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}
