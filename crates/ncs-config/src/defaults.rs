//! Built-in defaults, used when no configuration file can be read.

use crate::{ExceptionPolicy, FilterConfigFile};

/// Patterns suppressed out of the box.
pub const DEFAULT_SPAM_PATTERNS: &[&str] = &[
    ".*Lithium.*",
    ".*mismatch.*",
    ".*overloading.*",
    ".*moving.*wrongly.*",
    ".*Class Analysis Error.*",
];

/// Loggers silenced out of the box.
pub const DEFAULT_IGNORED_LOGGERS: &[&str] = &[
    "net.minecraft.class_5458",
    "net.minecraft.class_5459",
    "net.minecraft.class_5460",
];

/// The default file contents.
pub fn default_file() -> FilterConfigFile {
    FilterConfigFile {
        spam_patterns: DEFAULT_SPAM_PATTERNS.iter().map(|s| s.to_string()).collect(),
        ignored_loggers: DEFAULT_IGNORED_LOGGERS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        exception_settings: ExceptionPolicy::default(),
    }
}
