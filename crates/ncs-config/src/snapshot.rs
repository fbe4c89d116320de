//! Immutable configuration snapshots.
//!
//! A [`FilterConfig`] is built once, wrapped in an `Arc` and shared by every
//! thread that evaluates log events. It is never mutated; a reload builds a
//! new snapshot and swaps it in whole.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::defaults;
use crate::load::{DroppedPattern, LoadReport};
use crate::{ExceptionPolicy, FilterConfigFile, SpamPattern};

/// Validated filter configuration.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    spam_patterns: Vec<SpamPattern>,
    ignored_loggers: HashSet<String>,
    exception_policy: ExceptionPolicy,
}

impl FilterConfig {
    /// Build from already-compiled parts. Duplicate patterns are collapsed.
    pub fn new<I, S>(patterns: Vec<SpamPattern>, ignored_loggers: I, policy: ExceptionPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spam_patterns: Vec<SpamPattern> = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            if !spam_patterns.contains(&pattern) {
                spam_patterns.push(pattern);
            }
        }
        Self {
            spam_patterns,
            ignored_loggers: ignored_loggers.into_iter().map(Into::into).collect(),
            exception_policy: policy,
        }
    }

    /// Snapshot with no patterns, no ignored loggers and the given policy.
    pub fn empty(policy: ExceptionPolicy) -> Self {
        Self::new(Vec::new(), Vec::<String>::new(), policy)
    }

    /// The hard-coded fallback snapshot.
    pub fn builtin_default() -> Self {
        let (config, _report) = Self::from_file_model(&defaults::default_file());
        config
    }

    /// Validate a file model: invalid patterns and blank logger names are
    /// dropped and listed in the returned report.
    pub fn from_file_model(file: &FilterConfigFile) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let mut patterns = Vec::with_capacity(file.spam_patterns.len());

        for source in &file.spam_patterns {
            match SpamPattern::new(source) {
                Ok(pattern) => {
                    debug!(pattern = %source, "Added spam pattern");
                    patterns.push(pattern);
                }
                Err(e) => {
                    warn!(pattern = %source, error = %e, "Dropping invalid spam pattern");
                    report.dropped_patterns.push(DroppedPattern {
                        pattern: source.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut loggers = Vec::with_capacity(file.ignored_loggers.len());
        for logger in &file.ignored_loggers {
            if logger.trim().is_empty() {
                report.dropped_loggers += 1;
                continue;
            }
            debug!(logger = %logger, "Added ignored logger");
            loggers.push(logger.clone());
        }

        let config = Self::new(patterns, loggers, file.exception_settings.clone());
        (config, report)
    }

    /// Back to the file model (pattern sources, sorted logger names).
    pub fn to_file_model(&self) -> FilterConfigFile {
        let mut ignored_loggers: Vec<String> = self.ignored_loggers.iter().cloned().collect();
        ignored_loggers.sort();
        FilterConfigFile {
            spam_patterns: self
                .spam_patterns
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            ignored_loggers,
            exception_settings: self.exception_policy.clone(),
        }
    }

    pub fn spam_patterns(&self) -> &[SpamPattern] {
        &self.spam_patterns
    }

    pub fn ignored_loggers(&self) -> &HashSet<String> {
        &self.ignored_loggers
    }

    pub fn exception_policy(&self) -> &ExceptionPolicy {
        &self.exception_policy
    }

    /// SHA-256 over the canonical content (order-insensitive).
    pub fn fingerprint(&self) -> String {
        let mut patterns: Vec<&str> = self.spam_patterns.iter().map(|p| p.as_str()).collect();
        patterns.sort_unstable();
        let mut loggers: Vec<&str> = self.ignored_loggers.iter().map(String::as_str).collect();
        loggers.sort_unstable();

        let mut hasher = Sha256::new();
        for p in patterns {
            hasher.update(b"p:");
            hasher.update(p.as_bytes());
            hasher.update(b"\n");
        }
        for l in loggers {
            hasher.update(b"l:");
            hasher.update(l.as_bytes());
            hasher.update(b"\n");
        }
        // ExceptionPolicy only holds plain fields, serialization cannot fail
        if let Ok(policy) = serde_json::to_string(&self.exception_policy) {
            hasher.update(b"e:");
            hasher.update(policy.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::builtin_default()
    }
}
