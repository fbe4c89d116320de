//! Fuzz target for `spamfilters.json` parsing.
//!
//! Arbitrary input must either fail to parse or produce a snapshot whose
//! patterns all compile; it must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ncs_config::{FilterConfig, FilterConfigFile};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(file) = FilterConfigFile::parse_json(text) {
        let (config, report) = FilterConfig::from_file_model(&file);
        assert!(config.spam_patterns().len() + report.dropped_patterns.len() <= file.spam_patterns.len());
        let _ = config.fingerprint();
    }
});
