//! Engine counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters, safe to bump from any thread.
#[derive(Debug, Default)]
pub struct EngineStats {
    evaluated: AtomicU64,
    denied: AtomicU64,
    captured: AtomicU64,
    skipped: AtomicU64,
    capture_failures: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub evaluated: u64,
    pub denied: u64,
    pub captured: u64,
    /// Thrown errors the gate rejected.
    pub skipped: u64,
    pub capture_failures: u64,
    /// Records lost to a full or closed capture queue.
    pub dropped: u64,
}

impl EngineStats {
    pub fn record_evaluated(&self) {
        self.evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_denied(&self) {
        self.denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_captured(&self) {
        self.captured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capture_failure(&self) {
        self.capture_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            evaluated: self.evaluated.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            captured: self.captured.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            capture_failures: self.capture_failures.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
