//! Shared types for the console spam filter.
//!
//! This crate provides:
//! - Read-only views of the host's log records and thrown errors
//! - The suppression [`Verdict`]
//! - The coarse error [`Category`] taxonomy
//! - The unified [`Error`] type used across crate boundaries

pub mod category;
pub mod error;
pub mod record;
pub mod verdict;

pub use category::Category;
pub use error::{Error, Result};
pub use record::{
    ErrorKind, Frame, Level, LogMessage, LogRecord, MessageFormatError, ThrownError,
    MAX_CAUSE_DEPTH,
};
pub use verdict::Verdict;

/// Mod identifier; names the per-user config directory.
pub const MOD_ID: &str = "noconsolespam";
