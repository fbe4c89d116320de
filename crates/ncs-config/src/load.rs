//! Loading configuration with default-file bootstrap and fallback.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::defaults;
use crate::resolve::{default_config_path, resolve_config_path, ConfigSource};
use crate::{ConfigError, FilterConfig, FilterConfigFile};

/// A pattern rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedPattern {
    pub pattern: String,
    pub error: String,
}

/// What validation removed from a file model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub dropped_patterns: Vec<DroppedPattern>,
    /// Blank logger names skipped.
    pub dropped_loggers: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.dropped_patterns.is_empty() && self.dropped_loggers == 0
    }
}

/// Result of [`load_config`]: always carries a usable snapshot.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: FilterConfig,
    pub source: ConfigSource,
    /// File that was read (or attempted).
    pub path: Option<PathBuf>,
    pub report: LoadReport,
    /// Why the built-in defaults were used instead of the file, if they were.
    pub fallback_reason: Option<String>,
}

impl LoadedConfig {
    fn builtin(path: Option<PathBuf>, reason: Option<String>) -> Self {
        Self {
            config: FilterConfig::builtin_default(),
            source: ConfigSource::BuiltinDefault,
            path,
            report: LoadReport::default(),
            fallback_reason: reason,
        }
    }
}

/// Write the default configuration to `path` unless a file already exists.
///
/// Returns whether a file was created.
pub fn ensure_default_file(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }
    let json = defaults::default_file().to_json_pretty()?;
    std::fs::write(path, json).map_err(|e| ConfigError::io(path, e))?;
    info!(path = %path.display(), "Created default config file");
    Ok(true)
}

/// Read, parse and validate one file.
pub fn load_from_path(path: &Path) -> Result<(FilterConfig, LoadReport), ConfigError> {
    let file = FilterConfigFile::from_file(path)?;
    Ok(FilterConfig::from_file_model(&file))
}

/// Resolve, bootstrap if needed, and load. Never fails.
pub fn load_config(explicit: Option<&Path>) -> LoadedConfig {
    match resolve_config_path(explicit) {
        (Some(path), source) => load_or_fallback(path, source),
        (None, _) => match explicit {
            Some(path) => bootstrap_and_load(path, ConfigSource::Explicit),
            None => bootstrap_and_load(&default_config_path(), ConfigSource::WorkingDirectory),
        },
    }
}

/// Load from a fixed location, writing the default file there first if
/// it is missing. Never fails.
pub fn load_config_at(path: &Path) -> LoadedConfig {
    bootstrap_and_load(path, ConfigSource::Explicit)
}

fn bootstrap_and_load(path: &Path, source: ConfigSource) -> LoadedConfig {
    if let Err(e) = ensure_default_file(path) {
        error!(path = %path.display(), error = %e, "Failed to create default config file");
        return LoadedConfig::builtin(Some(path.to_path_buf()), Some(e.to_string()));
    }
    load_or_fallback(path.to_path_buf(), source)
}

fn load_or_fallback(path: PathBuf, source: ConfigSource) -> LoadedConfig {
    match load_from_path(&path) {
        Ok((config, report)) => {
            info!(
                path = %path.display(),
                source = %source,
                patterns = config.spam_patterns().len(),
                ignored_loggers = config.ignored_loggers().len(),
                dropped = report.dropped_patterns.len(),
                "Loaded spam filter config"
            );
            LoadedConfig {
                config,
                source,
                path: Some(path),
                report,
                fallback_reason: None,
            }
        }
        Err(e) => {
            error!(
                path = %path.display(),
                error = %e,
                "Error loading spam filter config, using built-in defaults"
            );
            LoadedConfig::builtin(Some(path), Some(e.to_string()))
        }
    }
}
