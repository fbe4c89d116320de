//! Read-only views of the host's log events.
//!
//! The host logging integration builds one [`LogRecord`] per emitted line and
//! hands it to the engine. Nothing here is retained past a single evaluation,
//! so every type is a plain owned value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Maximum number of links followed along a cause chain.
pub const MAX_CAUSE_DEPTH: usize = 16;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(format!("unknown level: {}", s)),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        };
        f.write_str(s)
    }
}

/// A message could not be formatted from its template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("message template has {placeholders} placeholders but {args} arguments")]
pub struct MessageFormatError {
    pub placeholders: usize,
    pub args: usize,
}

/// The message carried by a log event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogMessage {
    /// Already-rendered text.
    Text(String),
    /// A `{}`-placeholder template plus its rendered arguments.
    Formatted { format: String, args: Vec<String> },
}

impl LogMessage {
    /// Render the message, substituting `{}` placeholders in order.
    pub fn formatted(&self) -> Result<String, MessageFormatError> {
        match self {
            LogMessage::Text(text) => Ok(text.clone()),
            LogMessage::Formatted { format, args } => {
                let placeholders = format.matches("{}").count();
                if placeholders != args.len() {
                    return Err(MessageFormatError {
                        placeholders,
                        args: args.len(),
                    });
                }

                let mut out = String::with_capacity(format.len());
                let mut rest = format.as_str();
                for arg in args {
                    // count() above guarantees a placeholder is present
                    if let Some(idx) = rest.find("{}") {
                        out.push_str(&rest[..idx]);
                        out.push_str(arg);
                        rest = &rest[idx + 2..];
                    }
                }
                out.push_str(rest);
                Ok(out)
            }
        }
    }

    /// Raw textual representation; never fails.
    pub fn raw(&self) -> String {
        match self {
            LogMessage::Text(text) => text.clone(),
            LogMessage::Formatted { format, args } if args.is_empty() => format.clone(),
            LogMessage::Formatted { format, args } => {
                format!("{} [{}]", format, args.join(", "))
            }
        }
    }

    /// Formatted text, falling back to [`LogMessage::raw`].
    pub fn best_effort(&self) -> String {
        self.formatted().unwrap_or_else(|_| self.raw())
    }
}

impl From<&str> for LogMessage {
    fn from(s: &str) -> Self {
        LogMessage::Text(s.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(s: String) -> Self {
        LogMessage::Text(s)
    }
}

/// Capability tag supplied by the host's error representation.
///
/// This replaces inheritance checks: the host knows whether an error is a
/// runtime (unchecked) error, an I/O error, a fatal error or some other
/// checked error, and says so once per error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unchecked runtime error.
    Unchecked,
    /// I/O error.
    Io,
    /// Fatal, unrecoverable error (including assertion failures).
    Fatal,
    /// Any other checked error.
    Checked,
    /// The host could not tell.
    #[default]
    Unknown,
}

/// One stack frame.
///
/// Only `owning_type` takes part in classification; the other fields are
/// used when rendering a stack trace into a capture record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Dotted, fully qualified name of the type owning the frame.
    pub owning_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Frame {
    pub fn new(owning_type: impl Into<String>) -> Self {
        Self {
            owning_type: owning_type.into(),
            method: None,
            file: None,
            line: None,
        }
    }

    /// Attach the method, source file and line.
    pub fn at(mut self, method: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        self.method = Some(method.into());
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(method) = &self.method else {
            return f.write_str(&self.owning_type);
        };
        write!(f, "{}.{}(", self.owning_type, method)?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{})", file, line),
            (Some(file), None) => write!(f, "{})", file),
            _ => f.write_str("Unknown Source)"),
        }
    }
}

/// A thrown error attached to a log event.
///
/// The cause chain is kept at most [`MAX_CAUSE_DEPTH`] links long. Links
/// past the cap are dropped when the chain is built and the last kept link
/// is marked with [`ThrownError::is_cause_truncated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrownError {
    /// Fully qualified runtime type name.
    pub type_name: String,
    #[serde(default)]
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_cause"
    )]
    cause: Option<Box<ThrownError>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    cause_truncated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<ThrownError>,
    /// Frames in call order, innermost first.
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl ThrownError {
    pub fn new(type_name: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
            message: None,
            cause: None,
            cause_truncated: false,
            suppressed: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a cause, cutting the resulting chain at [`MAX_CAUSE_DEPTH`].
    pub fn with_cause(mut self, cause: ThrownError) -> Self {
        self.cause = Some(Box::new(cause));
        self.cause_truncated = false;
        truncate_chain(&mut self, MAX_CAUSE_DEPTH);
        self
    }

    /// Direct cause, if any.
    pub fn cause(&self) -> Option<&ThrownError> {
        self.cause.as_deref()
    }

    /// Whether links below this one were cut off.
    pub fn is_cause_truncated(&self) -> bool {
        self.cause_truncated
    }

    pub fn with_suppressed(mut self, suppressed: ThrownError) -> Self {
        self.suppressed.push(suppressed);
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_frames<I>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = Frame>,
    {
        self.frames.extend(frames);
        self
    }

    /// Unqualified type name: the last dotted segment, and for nested types
    /// the last `$` segment of that.
    pub fn simple_name(&self) -> &str {
        let after_dot = self
            .type_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.type_name);
        let simple = after_dot.rsplit('$').next().unwrap_or(after_dot);
        if simple.is_empty() {
            &self.type_name
        } else {
            simple
        }
    }

    /// `type: message`, or just the type when there is no message.
    pub fn summary(&self) -> String {
        match &self.message {
            Some(message) => format!("{}: {}", self.type_name, message),
            None => self.type_name.clone(),
        }
    }

    /// Walk the cause chain (excluding `self`), at most [`MAX_CAUSE_DEPTH`] links.
    pub fn causes(&self) -> Causes<'_> {
        Causes {
            next: self.cause.as_deref(),
            remaining: MAX_CAUSE_DEPTH,
        }
    }
}

impl std::fmt::Display for ThrownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Keep at most `max_links` causes below `node`.
fn truncate_chain(node: &mut ThrownError, max_links: usize) {
    let mut current = node;
    for _ in 0..max_links {
        match current.cause.as_deref_mut() {
            Some(next) => current = next,
            None => return,
        }
    }
    if current.cause.take().is_some() {
        current.cause_truncated = true;
    }
}

fn deserialize_cause<'de, D>(deserializer: D) -> Result<Option<Box<ThrownError>>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut cause = Option::<Box<ThrownError>>::deserialize(deserializer)?;
    if let Some(cause) = cause.as_deref_mut() {
        // the parent link counts towards the cap
        truncate_chain(cause, MAX_CAUSE_DEPTH.saturating_sub(1));
    }
    Ok(cause)
}

/// Iterator over a bounded cause chain.
pub struct Causes<'a> {
    next: Option<&'a ThrownError>,
    remaining: usize,
}

impl<'a> Iterator for Causes<'a> {
    type Item = &'a ThrownError;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = current.cause.as_deref();
        Some(current)
    }
}

/// One emitted log line as seen by the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub logger_name: String,
    pub level: Level,
    /// Absent messages behave like empty ones.
    #[serde(default)]
    pub message: Option<LogMessage>,
    #[serde(default)]
    pub thrown: Option<ThrownError>,
    pub thread_name: String,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Record with a plain text message, stamped now on the current thread.
    pub fn new(
        logger_name: impl Into<String>,
        level: Level,
        message: impl Into<LogMessage>,
    ) -> Self {
        Self {
            logger_name: logger_name.into(),
            level,
            message: Some(message.into()),
            thrown: None,
            thread_name: current_thread_name(),
            timestamp: Utc::now(),
        }
    }

    /// Record with a `{}` template and arguments.
    pub fn formatted<I, S>(
        logger_name: impl Into<String>,
        level: Level,
        format: impl Into<String>,
        args: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let message = LogMessage::Formatted {
            format: format.into(),
            args: args.into_iter().map(Into::into).collect(),
        };
        Self::new(logger_name, level, message)
    }

    /// Record with no message at all.
    pub fn without_message(logger_name: impl Into<String>, level: Level) -> Self {
        let mut record = Self::new(logger_name, level, "");
        record.message = None;
        record
    }

    pub fn with_thrown(mut self, thrown: ThrownError) -> Self {
        self.thrown = Some(thrown);
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Message text: formatted if possible, raw otherwise, empty if absent.
    pub fn message_text(&self) -> String {
        self.message
            .as_ref()
            .map(LogMessage::best_effort)
            .unwrap_or_default()
    }
}

fn current_thread_name() -> String {
    std::thread::current()
        .name()
        .unwrap_or("unnamed")
        .to_string()
}
