//! Configuration path discovery.
//!
//! Resolution order: explicit path → environment variables → working
//! directory → user config directory → built-in defaults.

use std::path::{Path, PathBuf};

use ncs_common::MOD_ID;

use crate::CONFIG_FILENAME;

/// Where the configuration was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided by the embedding application.
    Explicit,

    /// Set via `NCS_CONFIG` or `NCS_CONFIG_DIR`.
    Environment,

    /// `config/NoConsoleSpam/` under the working directory.
    WorkingDirectory,

    /// The user's config directory.
    UserConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit => write!(f, "explicit path"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::WorkingDirectory => write!(f, "working directory"),
            ConfigSource::UserConfig => write!(f, "user config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable naming the config file directly.
pub const ENV_CONFIG_PATH: &str = "NCS_CONFIG";

/// Environment variable naming a directory containing the config file.
pub const ENV_CONFIG_DIR: &str = "NCS_CONFIG_DIR";

/// Config directory relative to the working directory.
pub const WORKING_CONFIG_DIR: &str = "config/NoConsoleSpam";

/// Default location for a bootstrapped config file.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(WORKING_CONFIG_DIR).join(CONFIG_FILENAME)
}

/// User-level config file location, `<config dir>/noconsolespam/`, if the
/// platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(MOD_ID).join(CONFIG_FILENAME))
}

/// Find the configuration file to load.
///
/// Returns `(None, BuiltinDefault)` when no candidate exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
    // 1. Explicit path
    if let Some(path) = explicit {
        if path.is_file() {
            return (Some(path.to_path_buf()), ConfigSource::Explicit);
        }
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.is_file() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.is_file() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    // 4. Working directory
    let working = default_config_path();
    if working.is_file() {
        return (Some(working), ConfigSource::WorkingDirectory);
    }

    // 5. User config directory
    if let Some(path) = user_config_path() {
        if path.is_file() {
            return (Some(path), ConfigSource::UserConfig);
        }
    }

    (None, ConfigSource::BuiltinDefault)
}
