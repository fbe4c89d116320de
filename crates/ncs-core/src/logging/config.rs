//! Settings for the engine's own diagnostics.
//!
//! The engine sits inside the host's logging pipeline, so its own output
//! defaults to warnings and above. `NCS_LOG` takes a host level name
//! (`TRACE` .. `FATAL`) or `off`; `NCS_LOG_JSON` switches to JSON lines.

use ncs_common::Level;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding the minimum diagnostics level.
pub const ENV_LOG_LEVEL: &str = "NCS_LOG";

/// Environment variable selecting JSON output.
pub const ENV_LOG_JSON: &str = "NCS_LOG_JSON";

/// Engine diagnostics settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    /// Lowest level emitted; `None` silences the engine.
    pub level: Option<Level>,
    /// One JSON object per line instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Some(Level::Warn),
            json: false,
        }
    }
}

impl LogConfig {
    /// Read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`. Values that do not parse keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            match raw.trim() {
                s if s.eq_ignore_ascii_case("off") || s.eq_ignore_ascii_case("none") => {
                    config.level = None
                }
                s => {
                    if let Ok(level) = s.parse::<Level>() {
                        config.level = Some(level);
                    }
                }
            }
        }
        if let Some(raw) = lookup(ENV_LOG_JSON) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.json = true,
                "0" | "false" | "no" => config.json = false,
                _ => {}
            }
        }
        config
    }

    /// `tracing` has no fatal level; fatal maps to error.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level {
            None => LevelFilter::OFF,
            Some(Level::Trace) => LevelFilter::TRACE,
            Some(Level::Debug) => LevelFilter::DEBUG,
            Some(Level::Info) => LevelFilter::INFO,
            Some(Level::Warn) => LevelFilter::WARN,
            Some(Level::Error) | Some(Level::Fatal) => LevelFilter::ERROR,
        }
    }

    /// `EnvFilter` directive covering the engine crates.
    pub fn directive(&self) -> String {
        let level = self.level_filter().to_string().to_ascii_lowercase();
        format!("ncs_core={0},ncs_config={0}", level)
    }
}
