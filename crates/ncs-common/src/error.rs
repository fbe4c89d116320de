//! Error taxonomy for the filter and capture pipeline.
//!
//! Every variant is recoverable: callers log it and carry on. The only
//! externally visible effects of the system are the suppression verdict and
//! the capture files, so none of these ever reaches the host.
//!
//! | variant         | recovery                                              |
//! |-----------------|-------------------------------------------------------|
//! | `Configuration` | fall back to the built-in default snapshot            |
//! | `Directory`     | disable capture (root) or use the root bucket (sub)   |
//! | `Write`         | discard that one record                               |
//! | `Retention`     | leave the file in place; bucket may briefly overshoot |

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing configuration input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The capture root or a bucket directory could not be created.
    #[error("cannot create directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A capture record could not be written.
    #[error("cannot write capture record {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be deleted during retention enforcement.
    #[error("cannot delete {}: {source}", path.display())]
    Retention {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable numeric code for structured diagnostics.
    pub fn code(&self) -> u32 {
        match self {
            Error::Configuration(_) => 10,
            Error::Directory { .. } => 20,
            Error::Write { .. } => 21,
            Error::Retention { .. } => 22,
            Error::Io(_) => 29,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Directory {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }

    pub fn retention(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Retention {
            path: path.into(),
            source,
        }
    }
}
