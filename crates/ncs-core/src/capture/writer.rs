//! Writes capture records to disk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use ncs_common::{Error, Result, ThrownError};
use ncs_config::ExceptionPolicy;

use super::record::CaptureRecord;
use super::retention::{RetentionEnforcer, RetentionOutcome};

/// Where a record ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenRecord {
    pub path: PathBuf,
    pub bucket: PathBuf,
    pub retention: RetentionOutcome,
}

/// Files capture records under a root directory, one bucket per source.
#[derive(Debug)]
pub struct ExceptionWriter {
    root: PathBuf,
    organize_by_source: bool,
    retention: RetentionEnforcer,
}

impl ExceptionWriter {
    /// Open (creating if needed) the capture root.
    ///
    /// Fails with [`Error::Directory`] when the root cannot be created; the
    /// caller is expected to run with capture disabled in that case.
    pub fn open(root: impl Into<PathBuf>, policy: &ExceptionPolicy) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::directory(&root, e))?;
        info!(
            root = %root.display(),
            organize_by_source = policy.organize_by_source,
            max_records = policy.max_records_per_bucket,
            "Exception capture initialized"
        );
        Ok(Self {
            root,
            organize_by_source: policy.organize_by_source,
            retention: RetentionEnforcer::new(policy.max_records_per_bucket),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_records(&self) -> usize {
        self.retention.max_records()
    }

    /// Bucket directory for a source, created on first use.
    ///
    /// Falls back to the root when organizing is off, when the name could
    /// step outside the root, or when the directory cannot be created.
    pub fn bucket_for(&self, source_id: &str) -> PathBuf {
        if !self.organize_by_source {
            return self.root.clone();
        }
        if source_id.is_empty() || source_id.chars().all(|c| c == '.') {
            debug!(source_id, "Source id unusable as a directory, using root");
            return self.root.clone();
        }
        let bucket = self.root.join(source_id);
        match fs::create_dir_all(&bucket) {
            Ok(()) => bucket,
            Err(e) => {
                let err = Error::directory(&bucket, e);
                warn!(code = err.code(), "{}; writing to capture root", err);
                self.root.clone()
            }
        }
    }

    /// Write one record, then enforce retention.
    pub fn write(&self, record: &CaptureRecord) -> Result<WrittenRecord> {
        let bucket = self.bucket_for(&record.source_id);
        let name = record.file_name();
        let (path, mut file) =
            create_unique(&bucket, &name).map_err(|e| Error::write(bucket.join(&name), e))?;
        file.write_all(record.render().as_bytes())
            .map_err(|e| Error::write(&path, e))?;
        drop(file);
        debug!(
            path = %path.display(),
            source_id = %record.source_id,
            "Captured {}",
            record.error.type_name
        );

        let retention = self.enforce_retention(&bucket);
        Ok(WrittenRecord {
            path,
            bucket,
            retention,
        })
    }

    /// Write an unclassified error; the record's category reads
    /// `Uncategorized`.
    pub fn write_error(
        &self,
        source_id: &str,
        context: &str,
        error: &ThrownError,
    ) -> Result<WrittenRecord> {
        self.write(&CaptureRecord::new(source_id, context, error.clone()))
    }

    /// Trim the written bucket, then the root and all other buckets.
    ///
    /// Failures are logged and never surface as errors.
    pub fn enforce_retention(&self, written: &Path) -> RetentionOutcome {
        let mut outcome = match self.retention.enforce_bucket(written) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(bucket = %written.display(), error = %e, "Retention failed for bucket");
                RetentionOutcome::default()
            }
        };

        match self.retention.enforce_tree(&self.root, Some(written)) {
            Ok(tree) => {
                outcome.scanned += tree.scanned;
                outcome.deleted.extend(tree.deleted);
                outcome.failed.extend(tree.failed);
            }
            Err(e) => warn!(root = %self.root.display(), error = %e, "Retention sweep failed"),
        }

        if !outcome.deleted.is_empty() {
            debug!(deleted = outcome.deleted.len(), "Retention removed old capture records");
        }
        outcome
    }
}

/// Create `name` in `dir`, adding a counter before the extension while
/// the name is taken.
fn create_unique(dir: &Path, name: &str) -> io::Result<(PathBuf, File)> {
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, ""));
    let mut attempt = 0u32;
    loop {
        let path = match (attempt, ext.is_empty()) {
            (0, _) => dir.join(name),
            (n, true) => dir.join(format!("{}-{}", stem, n)),
            (n, false) => dir.join(format!("{}-{}.{}", stem, n, ext)),
        };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
