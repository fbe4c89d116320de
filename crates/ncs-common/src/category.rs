//! Error category taxonomy.
//!
//! A [`Category`] is a coarse, human-meaningful label attached to every
//! captured error. Categories come from two places:
//!
//! - The signature table, keyed on the error's type name (e.g. a name ending
//!   in `IOException` is [`Category::Io`]).
//! - The host's kind tag, when no signature matched (runtime-kind errors are
//!   [`Category::Runtime`], fatal ones [`Category::Error`], and so on).
//!
//! The label returned by [`Category::label`] is what appears in capture
//! records and in category-prefixed source identifiers.

use serde::{Deserialize, Serialize};

/// Coarse classification of a thrown error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Unchecked runtime errors.
    Runtime,
    /// I/O failures.
    #[serde(rename = "IO")]
    Io,
    /// Concurrent modification and interruption.
    Concurrent,
    /// Reflection and class loading.
    Reflection,
    /// Security manager / permission errors.
    Security,
    /// Sockets, connections and host resolution.
    Network,
    /// Parsing of numbers, dates and text.
    Parse,
    /// Structured data (JSON, NBT, serialization).
    Data,
    /// Host platform command syntax errors.
    Platform,
    /// Rendering, textures and shaders.
    Graphics,
    /// Out-of-memory conditions.
    Memory,
    /// Fatal, unrecoverable errors.
    Error,
    /// Any other checked error.
    General,
    /// Nothing applied.
    Unknown,
}

impl Category {
    /// All categories, signature categories first.
    pub fn all() -> &'static [Category] {
        &[
            Category::Runtime,
            Category::Io,
            Category::Concurrent,
            Category::Reflection,
            Category::Security,
            Category::Network,
            Category::Parse,
            Category::Data,
            Category::Platform,
            Category::Graphics,
            Category::Memory,
            Category::Error,
            Category::General,
            Category::Unknown,
        ]
    }

    /// Label used in capture records and source identifiers.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Runtime => "Runtime",
            Category::Io => "IO",
            Category::Concurrent => "Concurrent",
            Category::Reflection => "Reflection",
            Category::Security => "Security",
            Category::Network => "Network",
            Category::Parse => "Parse",
            Category::Data => "Data",
            Category::Platform => "Platform",
            Category::Graphics => "Graphics",
            Category::Memory => "Memory",
            Category::Error => "Error",
            Category::General => "General",
            Category::Unknown => "Unknown",
        }
    }

    /// Parse a label (case-insensitive).
    pub fn from_label(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(s))
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Unknown
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
