//! Exception capture policy.
//!
//! Mirrors the `exceptionSettings` object of `spamfilters.json`. Every
//! per-category flag defaults to `true`: capture is opt-out.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use ncs_common::Category;

/// Default number of records kept per bucket.
pub const DEFAULT_MAX_RECORDS_PER_BUCKET: usize = 3;

/// Default capture root, relative to the working directory.
pub const DEFAULT_CAPTURE_DIRECTORY: &str = "Console Errors";

/// Policy deciding whether and where thrown errors are captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionPolicy {
    /// Master switch; when false nothing is ever written.
    #[serde(default = "default_true", rename = "captureExceptions")]
    pub capture_enabled: bool,

    /// Group records in one sub-directory per source identifier.
    #[serde(default = "default_true")]
    pub organize_by_source: bool,

    /// Retention cap per bucket. Negative values in the file are read as 0.
    #[serde(
        default = "default_max_records",
        rename = "maxBackupIndex",
        alias = "maxRecordsPerBucket",
        deserialize_with = "deserialize_non_negative"
    )]
    pub max_records_per_bucket: usize,

    /// Root directory for capture records.
    #[serde(default = "default_capture_directory")]
    pub capture_directory: PathBuf,

    #[serde(flatten)]
    pub flags: CategoryFlags,
}

/// Per-category capture switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFlags {
    #[serde(default = "default_true", rename = "captureRuntimeExceptions")]
    pub runtime: bool,
    #[serde(default = "default_true", rename = "captureIOExceptions")]
    pub io: bool,
    /// Errors originating in the host mod loader.
    #[serde(default = "default_true", rename = "captureFabricExceptions")]
    pub host_framework: bool,
    /// Errors originating in the host platform itself.
    #[serde(default = "default_true", rename = "captureMinecraftExceptions")]
    pub host_platform: bool,
    #[serde(default = "default_true", rename = "captureReflectionExceptions")]
    pub reflection: bool,
    #[serde(default = "default_true", rename = "captureSecurityExceptions")]
    pub security: bool,
    #[serde(default = "default_true", rename = "captureNetworkExceptions")]
    pub network: bool,
    #[serde(default = "default_true", rename = "captureDataExceptions")]
    pub data: bool,
    /// Recorded for completeness; fatal errors are captured regardless.
    #[serde(default = "default_true", rename = "captureErrors")]
    pub errors: bool,
    #[serde(default = "default_true", rename = "captureConcurrentExceptions")]
    pub concurrent: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS_PER_BUCKET
}

fn default_capture_directory() -> PathBuf {
    PathBuf::from(DEFAULT_CAPTURE_DIRECTORY)
}

fn deserialize_non_negative<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(usize::try_from(value.max(0)).unwrap_or(usize::MAX))
}

impl Default for CategoryFlags {
    fn default() -> Self {
        Self::all(true)
    }
}

impl CategoryFlags {
    /// Every flag set to `value`.
    pub fn all(value: bool) -> Self {
        Self {
            runtime: value,
            io: value,
            host_framework: value,
            host_platform: value,
            reflection: value,
            security: value,
            network: value,
            data: value,
            errors: value,
            concurrent: value,
        }
    }

    /// Flag governing a signature category, if it has one.
    ///
    /// Parse errors share the data flag and host command-syntax errors the
    /// host-platform flag. Graphics and memory categories have no switch.
    pub fn for_category(&self, category: Category) -> Option<bool> {
        match category {
            Category::Runtime => Some(self.runtime),
            Category::Io => Some(self.io),
            Category::Concurrent => Some(self.concurrent),
            Category::Reflection => Some(self.reflection),
            Category::Security => Some(self.security),
            Category::Network => Some(self.network),
            Category::Parse | Category::Data => Some(self.data),
            Category::Platform => Some(self.host_platform),
            Category::Error => Some(self.errors),
            Category::Graphics | Category::Memory | Category::General | Category::Unknown => None,
        }
    }
}

impl Default for ExceptionPolicy {
    fn default() -> Self {
        Self {
            capture_enabled: true,
            organize_by_source: true,
            max_records_per_bucket: DEFAULT_MAX_RECORDS_PER_BUCKET,
            capture_directory: default_capture_directory(),
            flags: CategoryFlags::default(),
        }
    }
}

impl ExceptionPolicy {
    /// Policy that never captures anything.
    pub fn disabled() -> Self {
        Self {
            capture_enabled: false,
            ..Self::default()
        }
    }
}
