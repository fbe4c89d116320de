//! Capture record contents.

use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;

use ncs_common::{Category, ThrownError};

use crate::classify::{sanitize_source_id, ClassificationResult};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const FILE_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S-%3f";

/// Everything needed to write one capture record.
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    pub source_id: String,
    pub category: Option<Category>,
    /// `[Logger: ..] [Level: ..] [Thread: ..] message`
    pub context: String,
    pub error: ThrownError,
    pub captured_at: DateTime<Utc>,
}

impl CaptureRecord {
    pub fn new(source_id: impl Into<String>, context: impl Into<String>, error: ThrownError) -> Self {
        Self {
            source_id: source_id.into(),
            category: None,
            context: context.into(),
            error,
            captured_at: Utc::now(),
        }
    }

    pub fn from_classification(
        classification: &ClassificationResult,
        context: impl Into<String>,
        error: ThrownError,
    ) -> Self {
        Self::new(classification.source_id.clone(), context, error)
            .with_category(classification.category)
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    /// `<timestamp>_<SimpleName>.log`, in local time with milliseconds.
    pub fn file_name(&self) -> String {
        let stamp = self.captured_at.with_timezone(&Local).format(FILE_STAMP_FORMAT);
        format!("{}_{}.log", stamp, sanitize_source_id(self.error.simple_name()))
    }

    /// Full text body of the record.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(1024);
        let date = self.captured_at.with_timezone(&Local).format(DATE_FORMAT);
        let category = self
            .category
            .map(|c| c.label())
            .unwrap_or("Uncategorized");

        let _ = writeln!(out, "Date: {}", date);
        let _ = writeln!(out, "Exception: {}", self.error.type_name);
        let _ = writeln!(out, "Category: {}", category);
        let _ = writeln!(out, "Source: {}", self.source_id);
        let _ = writeln!(out, "Message: {}", self.context);
        let _ = writeln!(
            out,
            "Error Message: {}",
            self.error.message.as_deref().unwrap_or("(none)")
        );
        if let Some(cause) = self.error.cause() {
            let _ = writeln!(out, "Caused by: {}", cause.summary());
        }
        out.push('\n');
        out.push_str("StackTrace:\n");
        write_trace(&mut out, &self.error, "");

        if !self.error.suppressed.is_empty() {
            let _ = writeln!(out, "\nSuppressed ({}):", self.error.suppressed.len());
            for (idx, suppressed) in self.error.suppressed.iter().enumerate() {
                let _ = writeln!(out, "--- Suppressed #{} ---", idx + 1);
                write_trace(&mut out, suppressed, "");
            }
        }
        out
    }
}

/// Summary line, frames, then the bounded cause chain.
fn write_trace(out: &mut String, error: &ThrownError, indent: &str) {
    let _ = writeln!(out, "{}{}", indent, error.summary());
    write_frames(out, error, indent);

    let mut last = error;
    for cause in error.causes() {
        let _ = writeln!(out, "{}Caused by: {}", indent, cause.summary());
        write_frames(out, cause, indent);
        last = cause;
    }
    if last.cause().is_some() || last.is_cause_truncated() {
        let _ = writeln!(out, "{}\t... cause chain truncated", indent);
    }
}

fn write_frames(out: &mut String, error: &ThrownError, indent: &str) {
    for frame in &error.frames {
        let _ = writeln!(out, "{}\tat {}", indent, frame);
    }
}
