//! The per-event filter engine.
//!
//! [`FilterEngine::evaluate`] is called synchronously from the host's logging
//! path, possibly from many threads at once. It decides suppression from an
//! immutable configuration snapshot and, when the event carries a thrown
//! error, classifies it and writes a capture record. Nothing that happens
//! during capture can change the verdict or propagate to the caller.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

use ncs_common::{LogRecord, Result, ThrownError, Verdict};
use ncs_config::{ExceptionPolicy, FilterConfig};

use crate::capture::{
    CaptureRecord, CaptureWorker, ExceptionWriter, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS,
};
use crate::classify::Classifier;
use crate::gate::CaptureGate;
use crate::logging::truncate_for_log;
use crate::matcher::PatternMatcher;
use crate::signature::SignatureTable;
use crate::stats::{EngineStats, StatsSnapshot};

const LOGGED_MESSAGE_CHARS: usize = 120;

/// How capture records reach the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Written on the logging thread before `evaluate` returns.
    #[default]
    Inline,
    /// Queued for worker threads; dropped when the queue is full.
    Background { workers: usize, queue_capacity: usize },
}

impl CaptureMode {
    pub fn background() -> Self {
        CaptureMode::Background {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug)]
enum CaptureSink {
    Inline(ExceptionWriter),
    Background(CaptureWorker),
}

/// Builder for [`FilterEngine`].
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    config: Arc<FilterConfig>,
    table: Arc<SignatureTable>,
    capture_root: Option<PathBuf>,
    mode: CaptureMode,
    capture: bool,
}

impl EngineBuilder {
    /// Replace the configuration snapshot, keeping every other setting.
    pub fn with_config(mut self, config: Arc<FilterConfig>) -> Self {
        self.config = config;
        self
    }

    /// Use a custom signature table.
    pub fn signatures(mut self, table: Arc<SignatureTable>) -> Self {
        self.table = table;
        self
    }

    /// Override the capture root from the policy.
    pub fn capture_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.capture_root = Some(root.into());
        self
    }

    pub fn capture_mode(mut self, mode: CaptureMode) -> Self {
        self.mode = mode;
        self
    }

    /// Skip creating the capture writer entirely.
    pub fn without_capture(mut self) -> Self {
        self.capture = false;
        self
    }

    /// Build the engine. Never fails: if the capture root cannot be
    /// prepared, the engine runs with capture disabled.
    pub fn build(self) -> FilterEngine {
        let stats = Arc::new(EngineStats::default());
        let policy = self.config.exception_policy();

        let sink = if self.capture && policy.capture_enabled {
            let root = self
                .capture_root
                .unwrap_or_else(|| policy.capture_directory.clone());
            match open_sink(root, policy, self.mode, &stats) {
                Ok(sink) => Some(sink),
                Err(e) => {
                    error!(code = e.code(), "{}; exception capture disabled", e);
                    None
                }
            }
        } else {
            debug!("Exception capture disabled by configuration");
            None
        };

        FilterEngine {
            matcher: PatternMatcher::new(Arc::clone(&self.config)),
            classifier: Classifier::new(Arc::clone(&self.table)),
            gate: CaptureGate::new(self.table),
            config: self.config,
            sink,
            stats,
        }
    }
}

fn open_sink(
    root: PathBuf,
    policy: &ExceptionPolicy,
    mode: CaptureMode,
    stats: &Arc<EngineStats>,
) -> Result<CaptureSink> {
    let writer = ExceptionWriter::open(root, policy)?;
    match mode {
        CaptureMode::Inline => Ok(CaptureSink::Inline(writer)),
        CaptureMode::Background {
            workers,
            queue_capacity,
        } => {
            let worker =
                CaptureWorker::spawn(Arc::new(writer), workers, queue_capacity, Arc::clone(stats))?;
            Ok(CaptureSink::Background(worker))
        }
    }
}

/// Suppression and capture for one configuration snapshot.
#[derive(Debug)]
pub struct FilterEngine {
    config: Arc<FilterConfig>,
    matcher: PatternMatcher,
    classifier: Classifier,
    gate: CaptureGate,
    sink: Option<CaptureSink>,
    stats: Arc<EngineStats>,
}

impl FilterEngine {
    /// Engine with the built-in signatures and inline capture.
    pub fn new(config: Arc<FilterConfig>) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: Arc<FilterConfig>) -> EngineBuilder {
        EngineBuilder {
            config,
            table: SignatureTable::builtin(),
            capture_root: None,
            mode: CaptureMode::default(),
            capture: true,
        }
    }

    pub fn config(&self) -> &Arc<FilterConfig> {
        &self.config
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Whether a capture writer was set up.
    pub fn is_capture_initialized(&self) -> bool {
        self.sink.is_some()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Host filter hook: absent events are always let through.
    pub fn filter(&self, event: Option<&LogRecord>) -> Verdict {
        match event {
            Some(record) => self.evaluate(record),
            None => Verdict::Neutral,
        }
    }

    /// Decide one event, capturing its thrown error if there is one.
    ///
    /// Capture runs whether or not the event is suppressed.
    pub fn evaluate(&self, record: &LogRecord) -> Verdict {
        self.stats.record_evaluated();
        let message = record.message_text();
        let suppressed = self.matcher.suppress(&record.logger_name, &message);

        if let Some(thrown) = &record.thrown {
            self.capture_guarded(record, thrown, &message);
        }

        let verdict = Verdict::from_suppressed(suppressed);
        if verdict.is_deny() {
            self.stats.record_denied();
            trace!(
                logger = %record.logger_name,
                message = %truncate_for_log(&message, LOGGED_MESSAGE_CHARS),
                "Suppressed"
            );
        }
        verdict
    }

    fn capture_guarded(&self, record: &LogRecord, thrown: &ThrownError, message: &str) {
        let Some(sink) = &self.sink else {
            return;
        };
        if !self.config.exception_policy().capture_enabled {
            return;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.capture(sink, record, thrown, message)));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.stats.record_capture_failure();
                warn!(code = e.code(), "Exception capture failed: {}", e);
            }
            Err(_) => {
                self.stats.record_capture_failure();
                error!(exception = %thrown.type_name, "Exception capture panicked");
            }
        }
    }

    fn capture(
        &self,
        sink: &CaptureSink,
        record: &LogRecord,
        thrown: &ThrownError,
        message: &str,
    ) -> Result<()> {
        let policy = self.config.exception_policy();
        let classification = self.classifier.classify(thrown);
        let decision = self.gate.decide(thrown, classification.category, policy);
        if !decision.eligible {
            self.stats.record_skipped();
            debug!(
                exception = %thrown.type_name,
                category = %classification.category,
                reason = ?decision.reason,
                "Capture skipped"
            );
            return Ok(());
        }

        let capture = CaptureRecord::from_classification(
            &classification,
            context_message(record, message),
            thrown.clone(),
        )
        .with_captured_at(record.timestamp);
        match sink {
            CaptureSink::Inline(writer) => {
                writer.write(&capture)?;
                self.stats.record_captured();
            }
            CaptureSink::Background(worker) => {
                worker.submit(capture);
            }
        }
        Ok(())
    }

    /// Stop background workers after they finish queued records.
    ///
    /// Inline engines have nothing to flush.
    pub fn shutdown(self) {
        if let Some(CaptureSink::Background(worker)) = self.sink {
            worker.shutdown();
        }
    }
}

/// `[Logger: name] [Level: L] [Thread: t] message`; the logger part is
/// omitted when the name is empty.
pub fn context_message(record: &LogRecord, message: &str) -> String {
    let mut out = String::with_capacity(message.len() + 64);
    if !record.logger_name.is_empty() {
        out.push_str("[Logger: ");
        out.push_str(&record.logger_name);
        out.push_str("] ");
    }
    out.push_str(&format!(
        "[Level: {}] [Thread: {}] {}",
        record.level, record.thread_name, message
    ));
    out
}
