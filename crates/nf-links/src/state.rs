//! Serializable link state for checkpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, LinkResult};

/// Named scalar state of one link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkState {
    values: BTreeMap<String, f64>,
}

impl LinkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Read a value that must be present.
    pub fn require(&self, link: &str, key: &str) -> LinkResult<f64> {
        self.get(key).ok_or_else(|| LinkError::MissingState {
            link: link.to_string(),
            key: key.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
