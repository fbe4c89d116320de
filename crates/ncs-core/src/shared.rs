//! Lock-free handle over the current engine.
//!
//! Readers load the current [`FilterEngine`] without locking. A reload
//! builds a complete new engine and swaps it in; events already being
//! evaluated finish against the engine they started with.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

use ncs_common::{LogRecord, Verdict};
use ncs_config::FilterConfig;

use crate::engine::{EngineBuilder, FilterEngine};

/// Shared, atomically replaceable engine.
#[derive(Debug)]
pub struct SharedEngine {
    current: ArcSwap<FilterEngine>,
    template: EngineBuilder,
}

impl SharedEngine {
    /// Engine with default settings for `config`.
    pub fn new(config: Arc<FilterConfig>) -> Self {
        Self::from_builder(FilterEngine::builder(config))
    }

    /// Build the first engine from `builder`; later installs reuse its
    /// settings with a new configuration.
    pub fn from_builder(builder: EngineBuilder) -> Self {
        let engine = builder.clone().build();
        log_installed(engine.config());
        Self {
            current: ArcSwap::from_pointee(engine),
            template: builder,
        }
    }

    /// The engine in use right now.
    pub fn current(&self) -> Arc<FilterEngine> {
        self.current.load_full()
    }

    pub fn evaluate(&self, record: &LogRecord) -> Verdict {
        self.current.load().evaluate(record)
    }

    pub fn filter(&self, event: Option<&LogRecord>) -> Verdict {
        self.current.load().filter(event)
    }

    /// Swap in an engine built for `config`. Returns the previous engine.
    pub fn install(&self, config: Arc<FilterConfig>) -> Arc<FilterEngine> {
        let engine = self.template.clone().with_config(config).build();
        log_installed(engine.config());
        self.current.swap(Arc::new(engine))
    }
}

fn log_installed(config: &FilterConfig) {
    info!(
        fingerprint = %config.fingerprint(),
        patterns = config.spam_patterns().len(),
        ignored_loggers = config.ignored_loggers().len(),
        capture = config.exception_policy().capture_enabled,
        "Filter configuration installed"
    );
}
