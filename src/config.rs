//! Runner configuration, loaded once before the app starts.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// First id handed out when a spawn asks for an auto-assigned id
    pub first_entity_id: u64,

    /// Log every step and schedule transition at `debug` instead of `trace`
    pub log_steps: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            first_entity_id: 1,
            log_steps: false,
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
