//! The `spamfilters.json` file model.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ConfigError, ExceptionPolicy};

/// Raw, unvalidated contents of `spamfilters.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfigFile {
    /// Regex sources; invalid ones are dropped when compiled.
    #[serde(default)]
    pub spam_patterns: Vec<String>,

    /// Logger names whose events are always suppressed.
    #[serde(default)]
    pub ignored_loggers: Vec<String>,

    #[serde(default)]
    pub exception_settings: ExceptionPolicy,
}

impl FilterConfigFile {
    /// Load from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::parse_json(&content)
    }

    /// Parse from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON, as written when bootstrapping a default file.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
