//! Suppression decisions for individual log events.

use std::sync::Arc;

use ncs_config::FilterConfig;

/// Decides whether a single event is spam.
///
/// An event is suppressed when its logger is ignored, or when its message
/// fully matches at least one spam pattern. Partial matches never count.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    config: Arc<FilterConfig>,
}

impl PatternMatcher {
    pub fn new(config: Arc<FilterConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Arc<FilterConfig> {
        &self.config
    }

    /// Whether the event should be suppressed. Empty messages only match
    /// by logger name.
    pub fn suppress(&self, logger_name: &str, message: &str) -> bool {
        self.is_ignored_logger(logger_name) || self.matching_pattern(message).is_some()
    }

    pub fn is_ignored_logger(&self, logger_name: &str) -> bool {
        !logger_name.is_empty() && self.config.ignored_loggers().contains(logger_name)
    }

    /// Index of the first pattern that fully matches `message`.
    pub fn matching_pattern(&self, message: &str) -> Option<usize> {
        if message.is_empty() {
            return None;
        }
        self.config
            .spam_patterns()
            .iter()
            .position(|pattern| pattern.full_match(message))
    }
}
