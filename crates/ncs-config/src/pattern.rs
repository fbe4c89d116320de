//! Compiled spam patterns.

use regex::Regex;

use crate::ConfigError;

/// A compiled suppression pattern with full-string match semantics.
///
/// The pattern must match the entire message: `Lithium` does not match
/// `"Lithium is great"`, `.*Lithium.*` does. The source text is validated on
/// its own first, so a fragment like `a)(b` is rejected instead of becoming
/// valid once wrapped in anchors.
#[derive(Debug, Clone)]
pub struct SpamPattern {
    source: String,
    anchored: Regex,
}

impl SpamPattern {
    pub fn new(source: &str) -> Result<Self, ConfigError> {
        let invalid = |e: regex::Error| ConfigError::InvalidPattern {
            pattern: source.to_string(),
            error: e.to_string(),
        };
        Regex::new(source).map_err(invalid)?;
        let anchored = Regex::new(&format!("^(?:{})$", source)).map_err(invalid)?;
        Ok(Self {
            source: source.to_string(),
            anchored,
        })
    }

    /// The pattern as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the whole of `message` matches.
    pub fn full_match(&self, message: &str) -> bool {
        self.anchored.is_match(message)
    }
}

impl PartialEq for SpamPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for SpamPattern {}

impl std::fmt::Display for SpamPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
