//! Retention through the real writer: records on disk, mtimes pinned with
//! `filetime`.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use ncs_common::{Category, ErrorKind, ThrownError};
use ncs_config::ExceptionPolicy;
use ncs_core::{CaptureRecord, ExceptionWriter, RetentionEnforcer};
use tempfile::tempdir;

fn policy(organize: bool, max: usize) -> ExceptionPolicy {
    ExceptionPolicy {
        organize_by_source: organize,
        max_records_per_bucket: max,
        ..ExceptionPolicy::default()
    }
}

fn aged_file(path: &Path, age_secs: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"old record").unwrap();
    let ft = filetime::FileTime::from_system_time(SystemTime::now() - Duration::from_secs(age_secs));
    filetime::set_file_times(path, ft, ft).unwrap();
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn record(source: &str) -> CaptureRecord {
    let err = ThrownError::new("java.io.IOException", ErrorKind::Io).with_message("disk full");
    CaptureRecord::new(source, "[Level: ERROR] [Thread: main] save failed", err).with_category(Category::Io)
}

#[test]
fn newest_records_survive_a_write() {
    let dir = tempdir().unwrap();
    let bucket = dir.path().join("mymod");
    for (name, age) in [("a.log", 500), ("b.log", 400), ("c.log", 300), ("d.log", 200)] {
        aged_file(&bucket.join(name), age);
    }

    let writer = ExceptionWriter::open(dir.path(), &policy(true, 3)).unwrap();
    let written = writer.write(&record("mymod")).unwrap();

    let names = file_names(&bucket);
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"c.log".to_string()));
    assert!(names.contains(&"d.log".to_string()));
    assert!(written.path.is_file());
    assert_eq!(written.retention.deleted.len(), 2);
}

#[test]
fn write_sweeps_other_buckets_and_root() {
    let dir = tempdir().unwrap();
    for i in 0..5u64 {
        aged_file(&dir.path().join("stale").join(format!("s{}.log", i)), 1000 - i * 10);
        aged_file(&dir.path().join(format!("loose{}.log", i)), 1000 - i * 10);
    }

    let writer = ExceptionWriter::open(dir.path(), &policy(true, 2)).unwrap();
    writer.write(&record("fresh")).unwrap();

    assert_eq!(file_names(&dir.path().join("stale")), vec!["s3.log", "s4.log"]);
    assert_eq!(file_names(dir.path()), vec!["loose3.log", "loose4.log"]);
    assert_eq!(file_names(&dir.path().join("fresh")).len(), 1);
}

#[test]
fn flat_layout_caps_the_root() {
    let dir = tempdir().unwrap();
    for i in 0..3u64 {
        aged_file(&dir.path().join(format!("old{}.log", i)), 100 + i);
    }

    let writer = ExceptionWriter::open(dir.path(), &policy(false, 2)).unwrap();
    let written = writer.write(&record("ignored-when-flat")).unwrap();

    assert_eq!(written.bucket, dir.path());
    let names = file_names(dir.path());
    assert_eq!(names.len(), 2);
    // old0 is the youngest of the pre-existing files
    assert!(names.contains(&"old0.log".to_string()));
    assert!(!dir.path().join("ignored-when-flat").exists());
}

#[test]
fn exactly_k_newest_remain_after_n_writes() {
    let dir = tempdir().unwrap();
    let k = 3;
    let n = 7u64;
    for i in 0..n {
        // later index = more recent
        aged_file(&dir.path().join("bucket").join(format!("r{}.log", i)), 1000 - i * 10);
    }

    let outcome = RetentionEnforcer::new(k)
        .enforce_bucket(&dir.path().join("bucket"))
        .unwrap();

    assert_eq!(outcome.scanned, n as usize);
    assert_eq!(outcome.deleted.len(), n as usize - k);
    assert_eq!(
        file_names(&dir.path().join("bucket")),
        vec!["r4.log", "r5.log", "r6.log"]
    );
}

#[test]
fn zero_cap_keeps_nothing() {
    let dir = tempdir().unwrap();
    let writer = ExceptionWriter::open(dir.path(), &policy(true, 0)).unwrap();
    let written = writer.write(&record("gone")).unwrap();
    assert!(!written.path.exists());
    assert!(file_names(&dir.path().join("gone")).is_empty());
}
