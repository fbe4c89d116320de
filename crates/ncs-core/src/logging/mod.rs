//! Diagnostics for the engine itself.
//!
//! The engine only emits `tracing` events. A host that already installs a
//! subscriber needs nothing from here; standalone users can call
//! [`init_logging`] once at startup, usually with [`LogConfig::from_env`].
//!
//! Output goes to stderr, either human-readable or as JSON lines.

pub mod config;

pub use config::{LogConfig, ENV_LOG_JSON, ENV_LOG_LEVEL};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global subscriber.
///
/// `RUST_LOG` directives take precedence over `config.level`. Returns
/// `false` when a subscriber was already installed.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.directive()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .try_init()
    };
    result.is_ok()
}

/// Shorten a message for inclusion in a log line.
pub fn truncate_for_log(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...(truncated)", &s[..idx]),
    }
}
