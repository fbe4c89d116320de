//! Error classification: category and source identifier.
//!
//! The category comes from the first matching category signature, or from
//! the error's [`ErrorKind`] when none matches. The source identifier names
//! the bucket a capture record is filed under. It defaults to the simple
//! type name (prefixed with the category label when a signature matched),
//! and is replaced by a package identifier as soon as a stack frame is owned
//! by a recognised package.

use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

use ncs_common::{Category, ErrorKind, ThrownError};

use crate::signature::{package_identifier, PackageOrigin, SignatureTable};

/// Source identifier used when nothing usable is left after sanitizing.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Outcome of classifying one error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// Sanitized; contains only `[A-Za-z0-9.-]` and `_`.
    pub source_id: String,
    /// Whether `category` came from a category signature.
    pub from_signature: bool,
    /// Origin of the frame that named the source, if any.
    pub origin: Option<PackageOrigin>,
}

/// Classifies thrown errors against a shared [`SignatureTable`].
#[derive(Debug, Clone)]
pub struct Classifier {
    table: Arc<SignatureTable>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(SignatureTable::builtin())
    }
}

impl Classifier {
    pub fn new(table: Arc<SignatureTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<SignatureTable> {
        &self.table
    }

    /// Category of `error`, and whether a signature decided it.
    pub fn category_of(&self, error: &ThrownError) -> (Category, bool) {
        match self.table.category_for(error.simple_name(), &error.type_name) {
            Some(category) => (category, true),
            None => (fallback_category(error.kind), false),
        }
    }

    pub fn classify(&self, error: &ThrownError) -> ClassificationResult {
        let (category, from_signature) = self.category_of(error);

        let mut source_id = if from_signature {
            format!("{}-{}", category.label(), error.simple_name())
        } else {
            error.simple_name().to_string()
        };
        let mut origin = None;

        for frame in &error.frames {
            if let Some(found) = self.table.origin_of(&frame.owning_type) {
                source_id = package_identifier(&frame.owning_type).to_string();
                origin = Some(found);
                trace!(
                    owner = %frame.owning_type,
                    origin = ?found,
                    source_id = %source_id,
                    "Source attributed from stack frame"
                );
                break;
            }
        }

        let mut source_id = sanitize_source_id(&source_id);
        if source_id.is_empty() {
            source_id = UNKNOWN_SOURCE.to_string();
        }

        ClassificationResult {
            category,
            source_id,
            from_signature,
            origin,
        }
    }
}

/// Category implied by the error's kind alone.
pub fn fallback_category(kind: ErrorKind) -> Category {
    match kind {
        ErrorKind::Unchecked => Category::Runtime,
        ErrorKind::Io => Category::Io,
        ErrorKind::Fatal => Category::Error,
        ErrorKind::Checked => Category::General,
        ErrorKind::Unknown => Category::Unknown,
    }
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
///
/// One output character per input character.
pub fn sanitize_source_id(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
