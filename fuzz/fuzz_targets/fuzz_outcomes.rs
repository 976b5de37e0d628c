//! Fuzz target for outcome list parsing.
//!
//! Tests that arbitrary text either parses to a non-empty outcome list or
//! returns an error naming the group, without panicking.

#![no_main]

use fm_core::parse_outcomes;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        match parse_outcomes(text, "first") {
            Ok(outcomes) => assert!(!outcomes.is_empty()),
            Err(err) => assert_eq!(err.field(), Some("first")),
        }
    }
});
