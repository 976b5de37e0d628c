//! Reduce outcome sequences to group counts.
//!
//! Accepts comma- or whitespace-separated tokens, case-insensitive:
//! `1/0`, `true/false`, `t/f`, `yes/no`, `y/n`, `success/failure`.

use crate::sample::GroupSample;
use fm_common::{Error, Result};

fn parse_token(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "success" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "failure" => Some(false),
        _ => None,
    }
}

/// Parse an outcome list. `field` names the group in errors.
pub fn parse_outcomes(text: &str, field: &str) -> Result<Vec<bool>> {
    let outcomes = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(i, token)| {
            parse_token(token).ok_or_else(|| {
                Error::invalid(
                    field,
                    format!("unrecognized outcome '{token}' at position {}", i + 1),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if outcomes.is_empty() {
        return Err(Error::invalid(field, "no outcomes given"));
    }
    Ok(outcomes)
}

/// Parse an outcome list straight into counts.
pub fn parse_group(text: &str, field: &str) -> Result<GroupSample> {
    parse_outcomes(text, field).map(GroupSample::from_outcomes)
}
