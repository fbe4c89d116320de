//! Per-bucket retention.
//!
//! A bucket is one directory of capture records. After every write the
//! written bucket is trimmed to the cap, then the capture root and every
//! other bucket are trimmed as well. Oldest records (by modification time)
//! go first. Only plain files are ever considered or deleted.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use ncs_common::{Error, Result};

/// What one enforcement pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetentionOutcome {
    /// Files present before deletion.
    pub scanned: usize,
    pub deleted: Vec<PathBuf>,
    /// Files that should have been deleted but could not be.
    pub failed: Vec<PathBuf>,
}

impl RetentionOutcome {
    fn merge(&mut self, other: RetentionOutcome) {
        self.scanned += other.scanned;
        self.deleted.extend(other.deleted);
        self.failed.extend(other.failed);
    }
}

/// Keeps each bucket at or below `max_records` files.
#[derive(Debug, Clone, Copy)]
pub struct RetentionEnforcer {
    max_records: usize,
}

#[derive(Debug)]
struct BucketEntry {
    path: PathBuf,
    modified: SystemTime,
}

impl RetentionEnforcer {
    pub fn new(max_records: usize) -> Self {
        Self { max_records }
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// Trim a single directory.
    pub fn enforce_bucket(&self, dir: &Path) -> Result<RetentionOutcome> {
        let mut entries = scan_bucket(dir)?;
        let mut outcome = RetentionOutcome {
            scanned: entries.len(),
            ..RetentionOutcome::default()
        };
        if entries.len() <= self.max_records {
            return Ok(outcome);
        }

        entries.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
        let excess = entries.len() - self.max_records;

        for entry in entries.into_iter().take(excess) {
            match fs::remove_file(&entry.path) {
                Ok(()) => {
                    debug!(path = %entry.path.display(), "Deleted old capture record");
                    outcome.deleted.push(entry.path);
                }
                // another writer got there first
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    outcome.deleted.push(entry.path);
                }
                Err(e) => {
                    let err = Error::retention(&entry.path, e);
                    warn!(code = err.code(), "{}", err);
                    outcome.failed.push(entry.path);
                }
            }
        }
        Ok(outcome)
    }

    /// Trim `root` and every direct sub-directory except `skip`.
    ///
    /// Unreadable buckets are logged and skipped.
    pub fn enforce_tree(&self, root: &Path, skip: Option<&Path>) -> Result<RetentionOutcome> {
        let mut outcome = RetentionOutcome::default();
        if skip != Some(root) {
            outcome.merge(self.enforce_bucket(root)?);
        }

        for entry in fs::read_dir(root)? {
            let entry = entry?;
            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir || skip == Some(path.as_path()) {
                continue;
            }
            match self.enforce_bucket(&path) {
                Ok(bucket) => outcome.merge(bucket),
                Err(e) => warn!(bucket = %path.display(), error = %e, "Skipping unreadable bucket"),
            }
        }
        Ok(outcome)
    }
}

fn scan_bucket(dir: &Path) -> Result<Vec<BucketEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(metadata) = entry.metadata() else {
            // vanished between listing and stat
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        entries.push(BucketEntry {
            path: entry.path(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }
    Ok(entries)
}
