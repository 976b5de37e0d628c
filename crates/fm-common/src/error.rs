//! Error types for the Farrington-Manning score test.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation suggestions for humans
//!
//! All computational failures are terminal for a single invocation. The test
//! is a pure function of its inputs, so none of them is worth retrying.
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Invalid Argument
//!   Reason: invalid argument `x1`: events (12) exceed total (10)
//!   Fix: Check the group counts: events must lie between 0 and the group total.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 10,
//!   "category": "input",
//!   "message": "invalid argument `x1`: events (12) exceed total (10)",
//!   "recoverable": false,
//!   "context": { "field": "x1" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for score test operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or out-of-domain inputs.
    Input,
    /// Valid inputs that produce an undefined statistic, or root selection failures.
    Numerical,
    /// Settings file errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Numerical => write!(f, "numerical"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for the score test.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("invalid argument `{field}`: {message}")]
    InvalidArgument { field: String, message: String },

    // Numerical errors (30-39)
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    // Configuration errors (40-49)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 30-39: Numerical errors
    /// - 40-49: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidArgument { .. } => 10,
            Error::DegenerateInput(_) => 30,
            Error::NumericalDegeneracy(_) => 31,
            Error::Config(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidArgument { .. } => ErrorCategory::Input,
            Error::DegenerateInput(_) | Error::NumericalDegeneracy(_) => ErrorCategory::Numerical,
            Error::Config(_) => ErrorCategory::Config,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether retrying the same call could succeed.
    ///
    /// Only I/O is transient; every test computation is deterministic.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Name of the offending input field, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::InvalidArgument { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidArgument { .. } => {
                "Check the group counts: events must lie between 0 and the group total, totals and person-time must be positive, delta in (-1, 1), rho > 0."
            }
            Error::DegenerateInput(_) => {
                "The statistic is undefined for these counts (zero variance). Both groups sit at the same boundary; no test is possible."
            }
            Error::NumericalDegeneracy(_) => {
                "Internal root selection failed. Report the inputs as a bug."
            }
            Error::Config(_) => {
                "Run 'fm-test config' to see the resolved settings, or fix the settings file syntax."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Report as a bug: result serialization failed.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidArgument { .. } => "Invalid Argument",
            Error::DegenerateInput(_) => "Degenerate Input",
            Error::NumericalDegeneracy(_) => "Numerical Degeneracy",
            Error::Config(_) => "Configuration Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Serialization Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., offending field).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();
        if let Some(field) = err.field() {
            context.insert("field".to_string(), serde_json::json!(field));
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
