//! Exit codes for the fm-test CLI.
//!
//! Exit code ranges:
//! - 0: Success
//! - 10-19: Problems with the inputs (fixable by the caller)
//! - 20-29: Internal errors (root selection failures, I/O)

use fm_common::Error;

/// Exit codes for fm-test operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Success (0)
    // ========================================================================
    /// Test computed and printed.
    Clean = 0,

    // ========================================================================
    // Input Errors (10-19)
    // ========================================================================
    /// Invalid arguments (out-of-domain counts, delta, rho, alternative).
    ArgsError = 10,

    /// Inputs valid but the statistic is undefined (zero null variance).
    DegenerateInput = 11,

    /// Settings file missing, malformed, or out of range.
    ConfigError = 12,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// No admissible likelihood root (bug - please report).
    NumericalDegeneracy = 20,

    /// I/O or serialization error.
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code is an internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::DegenerateInput => "ERR_DEGENERATE_INPUT",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::NumericalDegeneracy => "ERR_NUMERICAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidArgument { .. } => ExitCode::ArgsError,
            Error::DegenerateInput(_) => ExitCode::DegenerateInput,
            Error::Config(_) => ExitCode::ConfigError,
            Error::NumericalDegeneracy(_) => ExitCode::NumericalDegeneracy,
            Error::Io(_) | Error::Json(_) => ExitCode::IoError,
        }
    }
}
