//! Fuzz target for settings file parsing.
//!
//! Tests that TOML settings parsing handles arbitrary input without
//! panicking, and that anything accepted passes validation.

#![no_main]

use fm_core::Settings;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(settings) = Settings::from_toml_str(text, Path::new("fuzz.toml")) {
            assert!(settings.validate().is_ok());
        }
    }
});
