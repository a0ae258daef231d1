//! Serializable network snapshots.

use nf_links::LinkState;
use serde::{Deserialize, Serialize};

use crate::error::SimResult;

/// Node potentials, link enables and link state at a step boundary.
///
/// Vectors are indexed by node and link creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub time: f64,
    pub steps: u64,
    pub potentials: Vec<f64>,
    pub enabled: Vec<bool>,
    pub links: Vec<LinkState>,
}

impl Checkpoint {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
