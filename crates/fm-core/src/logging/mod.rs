//! Structured logging for the score test driver and CLI.
//!
//! - stdout is reserved for command payloads (JSON/MD/summary output)
//! - stderr receives all log output (human or JSON lines)
//!
//! A full `RUST_LOG` directive string wins over the resolved level, so
//! `RUST_LOG=fm_core=trace` still works for ad-hoc debugging.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel, LogOverrides};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events the default filter admits.
const LOG_TARGETS: [&str; 2] = ["fm_core", "fm_test"];

/// Filter directives for `level` over this workspace's targets.
pub fn default_directives(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.level)));

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .flatten_event(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .init();
        }
    }
}
