//! End-to-end scenarios through `FilterEngine::evaluate` against a real
//! capture root.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ncs_common::{ErrorKind, Frame, Level, LogRecord, ThrownError, Verdict};
use ncs_config::{CategoryFlags, ExceptionPolicy, FilterConfig, SpamPattern};
use ncs_core::{CaptureMode, FilterEngine};
use tempfile::{tempdir, TempDir};

fn engine_with(patterns: &[&str], loggers: &[&str], policy: ExceptionPolicy) -> (FilterEngine, TempDir) {
    let dir = tempdir().unwrap();
    let patterns = patterns.iter().map(|p| SpamPattern::new(p).unwrap()).collect();
    let config = Arc::new(FilterConfig::new(patterns, loggers.iter().copied(), policy));
    let engine = FilterEngine::builder(config).capture_root(dir.path()).build();
    (engine, dir)
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap().flatten() {
        let path = entry.path();
        if path.is_dir() {
            out.extend(files_under(&path));
        } else {
            out.push(path);
        }
    }
    out
}

#[test]
fn spam_without_thrown_error_is_denied_and_not_captured() {
    let (engine, dir) = engine_with(&[".*mismatch.*"], &[], ExceptionPolicy::default());
    let record = LogRecord::new(
        "com.example.mod.Foo",
        Level::Warn,
        "Lithium optimizer mismatch detected",
    );

    assert_eq!(engine.evaluate(&record), Verdict::Deny);
    assert!(files_under(dir.path()).is_empty());
}

#[test]
fn ignored_logger_is_denied_and_still_captured() {
    let (engine, dir) = engine_with(&[], &["net.minecraft.class_5458"], ExceptionPolicy::default());
    let thrown = ThrownError::new("java.lang.IllegalStateException", ErrorKind::Unchecked)
        .with_message("bad state")
        .with_frame(Frame::new("com.example.mymod.Thing").at("tick", "Thing.java", 12));
    let record = LogRecord::new("net.minecraft.class_5458", Level::Error, "anything").with_thrown(thrown);

    assert_eq!(engine.evaluate(&record), Verdict::Deny);

    let files = files_under(dir.path());
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].parent().unwrap(), dir.path().join("mymod"));
    let body = fs::read_to_string(&files[0]).unwrap();
    assert!(body.contains("Exception: java.lang.IllegalStateException\n"));
    assert!(body.contains("Category: Runtime\n"));
    assert!(body.contains("[Logger: net.minecraft.class_5458] [Level: ERROR]"));
}

#[test]
fn unsignatured_network_error_is_gated_by_runtime_flag() {
    let flags = CategoryFlags {
        network: false,
        runtime: true,
        ..CategoryFlags::default()
    };
    let policy = ExceptionPolicy {
        flags,
        ..ExceptionPolicy::default()
    };
    let (engine, dir) = engine_with(&[], &[], policy);
    let thrown = ThrownError::new("com.example.net.RemoteHiccup", ErrorKind::Unchecked);
    let record = LogRecord::new("com.example.A", Level::Error, "remote failed").with_thrown(thrown);

    assert_eq!(engine.evaluate(&record), Verdict::Neutral);
    assert_eq!(files_under(dir.path()).len(), 1);
    assert_eq!(engine.stats().captured, 1);
}

#[test]
fn signatured_network_error_respects_network_flag() {
    let policy = ExceptionPolicy {
        flags: CategoryFlags {
            network: false,
            ..CategoryFlags::default()
        },
        ..ExceptionPolicy::default()
    };
    let (engine, dir) = engine_with(&[], &[], policy);
    let thrown = ThrownError::new("java.net.ConnectException", ErrorKind::Io);
    engine.evaluate(&LogRecord::new("a", Level::Error, "x").with_thrown(thrown));

    assert!(files_under(dir.path()).is_empty());
    assert_eq!(engine.stats().skipped, 1);
}

#[test]
fn fatal_error_captured_with_all_flags_off() {
    let policy = ExceptionPolicy {
        flags: CategoryFlags::all(false),
        ..ExceptionPolicy::default()
    };
    let (engine, dir) = engine_with(&[], &[], policy);
    let thrown = ThrownError::new("java.lang.StackOverflowError", ErrorKind::Fatal);
    engine.evaluate(&LogRecord::new("a", Level::Fatal, "crash").with_thrown(thrown));

    let files = files_under(dir.path());
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].parent().unwrap(), dir.path().join("StackOverflowError"));
}

#[test]
fn signature_source_prefix_names_bucket() {
    let (engine, dir) = engine_with(&[], &[], ExceptionPolicy::default());
    let thrown = ThrownError::new("com.example.FooBarIOException", ErrorKind::Io);
    engine.evaluate(&LogRecord::new("a", Level::Error, "x").with_thrown(thrown));

    assert!(dir.path().join("IO-FooBarIOException").is_dir());
}

#[test]
fn partial_match_is_not_suppressed() {
    let (engine, _dir) = engine_with(&["Lithium"], &[], ExceptionPolicy::disabled());
    let record = LogRecord::new("com.example.A", Level::Info, "Lithium is great");
    assert_eq!(engine.evaluate(&record), Verdict::Neutral);
}

#[test]
fn formatted_message_is_matched_after_substitution() {
    let (engine, _dir) = engine_with(&["Player \\w+ moved wrongly!"], &[], ExceptionPolicy::disabled());
    let record = LogRecord::formatted("a", Level::Warn, "Player {} moved wrongly!", ["Steve"]);
    assert_eq!(engine.evaluate(&record), Verdict::Deny);
}

#[test]
fn broken_template_falls_back_to_raw_message() {
    let (engine, _dir) = engine_with(&["Value \\{\\} \\[.*\\]"], &[], ExceptionPolicy::disabled());
    let record = LogRecord::formatted("a", Level::Warn, "Value {}", ["1", "2"]);
    assert_eq!(engine.evaluate(&record), Verdict::Deny);
}

#[test]
fn missing_message_only_matches_by_logger() {
    let (engine, _dir) = engine_with(&[".*"], &["quiet.Logger"], ExceptionPolicy::disabled());
    assert_eq!(
        engine.evaluate(&LogRecord::without_message("loud.Logger", Level::Info)),
        Verdict::Neutral
    );
    assert_eq!(
        engine.evaluate(&LogRecord::without_message("quiet.Logger", Level::Info)),
        Verdict::Deny
    );
}

#[test]
fn retention_caps_repeated_captures() {
    let policy = ExceptionPolicy {
        max_records_per_bucket: 2,
        ..ExceptionPolicy::default()
    };
    let (engine, dir) = engine_with(&[], &[], policy);
    for i in 0..5 {
        let thrown = ThrownError::new("java.io.IOException", ErrorKind::Io)
            .with_message(format!("attempt {}", i))
            .with_frame(Frame::new("com.example.mymod.Saver"));
        engine.evaluate(&LogRecord::new("a", Level::Error, "save failed").with_thrown(thrown));
    }

    assert_eq!(files_under(&dir.path().join("mymod")).len(), 2);
    assert_eq!(engine.stats().captured, 5);
}

#[test]
fn background_mode_matches_inline_output() {
    let dir = tempdir().unwrap();
    let config = Arc::new(FilterConfig::empty(ExceptionPolicy::default()));
    let engine = FilterEngine::builder(config)
        .capture_root(dir.path())
        .capture_mode(CaptureMode::Background {
            workers: 2,
            queue_capacity: 16,
        })
        .build();

    let thrown = ThrownError::new("java.lang.NullPointerException", ErrorKind::Unchecked)
        .with_frame(Frame::new("com.example.other.Widget"));
    assert_eq!(
        engine.evaluate(&LogRecord::new("a", Level::Error, "npe").with_thrown(thrown)),
        Verdict::Neutral
    );
    engine.shutdown();

    assert_eq!(files_under(&dir.path().join("other")).len(), 1);
}

#[test]
fn deep_cause_chain_is_captured_without_overflow() {
    let (engine, dir) = engine_with(&[], &[], ExceptionPolicy::default());
    let mut thrown = ThrownError::new("java.lang.IllegalStateException", ErrorKind::Unchecked);
    for i in 0..200_000 {
        thrown = ThrownError::new("java.lang.RuntimeException", ErrorKind::Unchecked)
            .with_message(format!("wrap {}", i))
            .with_cause(thrown);
    }
    let record = LogRecord::new("a", Level::Error, "deep").with_thrown(thrown);

    assert_eq!(engine.evaluate(&record), Verdict::Neutral);
    assert_eq!(engine.stats().captured, 1);

    let files = files_under(dir.path());
    assert_eq!(files.len(), 1);
    let body = fs::read_to_string(&files[0]).unwrap();
    assert!(body.contains("cause chain truncated"));
}

#[test]
fn reflective_errors_captured_with_all_flags_off() {
    let policy = ExceptionPolicy {
        flags: CategoryFlags::all(false),
        ..ExceptionPolicy::default()
    };
    let (engine, dir) = engine_with(&[], &[], policy);
    let thrown = ThrownError::new("java.lang.NoSuchMethodException", ErrorKind::Checked)
        .with_frame(Frame::new("com.example.mymod.Hooks"));
    engine.evaluate(&LogRecord::new("a", Level::Error, "hook lookup").with_thrown(thrown));

    assert_eq!(files_under(&dir.path().join("mymod")).len(), 1);
    assert_eq!(engine.stats().captured, 1);
}

#[test]
fn capture_record_is_dated_by_the_event() {
    let (engine, dir) = engine_with(&[], &[], ExceptionPolicy::default());
    let at = chrono::DateTime::parse_from_rfc3339("2024-03-05T10:20:30.456Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let thrown = ThrownError::new("java.io.IOException", ErrorKind::Io);
    let record = LogRecord::new("a", Level::Error, "late").with_thrown(thrown).with_timestamp(at);
    engine.evaluate(&record);

    let local = at.with_timezone(&chrono::Local);
    let files = files_under(dir.path());
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(&local.format("%Y-%m-%d_%H-%M-%S-%3f").to_string()));
    let body = fs::read_to_string(&files[0]).unwrap();
    assert!(body.starts_with(&format!("Date: {}\n", local.format("%Y-%m-%d %H:%M:%S%.3f"))));
}
