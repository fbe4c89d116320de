//! Fuzz target for the suppression predicate.
//!
//! The first line of the input is used as a spam pattern, the second as the
//! logger name and the rest as the message.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use ncs_config::{ExceptionPolicy, FilterConfig, SpamPattern};
use ncs_core::PatternMatcher;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut parts = text.splitn(3, '\n');
    let pattern = parts.next().unwrap_or_default();
    let logger = parts.next().unwrap_or_default();
    let message = parts.next().unwrap_or_default();

    // invalid patterns are rejected at load time
    let Ok(pattern) = SpamPattern::new(pattern) else {
        return;
    };
    let config = FilterConfig::new(vec![pattern], [logger], ExceptionPolicy::disabled());
    let matcher = PatternMatcher::new(Arc::new(config));
    let suppressed = matcher.suppress(logger, message);
    if !logger.is_empty() {
        assert!(suppressed);
    }
});
