//! Configuration for the console spam filter.
//!
//! This crate provides:
//! - The immutable [`FilterConfig`] snapshot consumed by the filter engine
//! - The `spamfilters.json` file model and its built-in defaults
//! - Path resolution (explicit path → env → working directory → user config dir)
//! - Validation: invalid patterns and blank logger names never reach a snapshot
//!
//! Loading never fails. Anything that goes wrong while reading or parsing
//! falls back to the built-in defaults and is reported through `tracing`.

pub mod defaults;
pub mod error;
pub mod file;
pub mod load;
pub mod pattern;
pub mod policy;
pub mod resolve;
pub mod snapshot;

pub use error::ConfigError;
pub use file::FilterConfigFile;
pub use load::{
    ensure_default_file, load_config, load_config_at, load_from_path, DroppedPattern, LoadReport,
    LoadedConfig,
};
pub use pattern::SpamPattern;
pub use policy::{CategoryFlags, ExceptionPolicy};
pub use resolve::{resolve_config_path, ConfigSource};
pub use snapshot::FilterConfig;

/// Name of the configuration file.
pub const CONFIG_FILENAME: &str = "spamfilters.json";
