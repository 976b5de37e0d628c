//! Shared types for the Farrington-Manning score test.
//!
//! This crate provides foundational types shared across the workspace:
//! - The error taxonomy (input, numerical, config, I/O)
//! - Output format selection

pub mod error;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use output::OutputFormat;
