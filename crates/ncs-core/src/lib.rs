//! Console spam filter and exception triage engine.
//!
//! Every log event the host emits passes through [`FilterEngine::evaluate`]:
//!
//! - Suppression: the event is denied when its logger is ignored or its
//!   message fully matches a configured spam pattern.
//! - Capture: when the event carries a thrown error, the error is
//!   classified (category and source), run through the capture gate, and
//!   written as a text record into a per-source bucket with a retention cap.
//!
//! Capture never changes the verdict and never fails the caller.
//!
//! ```ignore
//! use std::sync::Arc;
//! use ncs_core::{FilterEngine, SharedEngine};
//!
//! let loaded = ncs_config::load_config(None);
//! let engine = SharedEngine::new(Arc::new(loaded.config));
//! let verdict = engine.evaluate(&record);
//! ```

pub mod capture;
pub mod classify;
pub mod engine;
pub mod gate;
pub mod logging;
pub mod matcher;
pub mod shared;
pub mod signature;
pub mod stats;

pub use capture::{CaptureRecord, CaptureWorker, ExceptionWriter, RetentionEnforcer, RetentionOutcome};
pub use classify::{sanitize_source_id, ClassificationResult, Classifier};
pub use engine::{context_message, CaptureMode, EngineBuilder, FilterEngine};
pub use gate::{CaptureGate, GateDecision, GateReason};
pub use matcher::PatternMatcher;
pub use shared::SharedEngine;
pub use signature::{PackageOrigin, PackageSignature, SignatureTable};
pub use stats::{EngineStats, StatsSnapshot};

pub use ncs_common::{LogRecord, Verdict};
