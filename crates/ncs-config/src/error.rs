//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading, parsing or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid regex pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ConfigError> for ncs_common::Error {
    fn from(err: ConfigError) -> Self {
        ncs_common::Error::Configuration(err.to_string())
    }
}
