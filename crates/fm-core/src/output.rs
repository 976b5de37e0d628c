//! Rendering of test results and errors for the CLI.

use crate::result::TestResult;
use fm_common::{format_error_human, Error, OutputFormat, Result, StructuredError};

/// Format `v` with `digits` significant digits.
///
/// Magnitudes below `1e-4` or at least `1e15` switch to scientific notation
/// so tiny p-values stay readable.
pub fn format_significant(v: f64, digits: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return v.to_string();
    }
    let digits = digits.max(1);
    let magnitude = v.abs().log10().floor() as i32;
    if !(-4..15).contains(&magnitude) {
        return format!("{:.*e}", digits - 1, v);
    }
    let decimals = (digits as i32 - 1 - magnitude).max(0) as usize;
    format!("{:.*}", decimals, v)
}

/// Render a result in the requested format.
pub fn render_result(result: &TestResult, format: OutputFormat, precision: usize) -> Result<String> {
    let fmt = |v: f64| format_significant(v, precision);
    let null_name = result.variant.null_field();

    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Md => {
            let estimate = result.estimate.map_or_else(|| "n/a".to_string(), fmt);
            let rows = [
                ("Variant", result.variant.to_string()),
                ("Alternative", result.alternative.to_string()),
                (null_name, fmt(result.null_value)),
                ("Statistic (z)", fmt(result.statistic)),
                ("p-value", fmt(result.p_value)),
                ("Observed effect", estimate),
                (
                    "Constrained estimate",
                    format!(
                        "({}, {})",
                        fmt(result.constrained.first),
                        fmt(result.constrained.second)
                    ),
                ),
                ("Standard error", fmt(result.standard_error)),
            ];
            let mut out = String::from("# Farrington-Manning Score Test\n\n| Field | Value |\n|---|---|\n");
            for (field, value) in rows {
                out.push_str(&format!("| {field} | {value} |\n"));
            }
            out
        }
        OutputFormat::Summary => format!(
            "{} ({} = {}, {}): z = {}, p = {}",
            result.variant,
            null_name,
            fmt(result.null_value),
            result.alternative,
            fmt(result.statistic),
            fmt(result.p_value),
        ),
    };
    Ok(text)
}

/// Render an error for stderr.
pub fn render_error(err: &Error, format: OutputFormat, use_color: bool) -> String {
    match format {
        OutputFormat::Json => StructuredError::from(err).to_json_pretty(),
        OutputFormat::Md | OutputFormat::Summary => format_error_human(err, use_color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::{Alternative, Variant};
    use crate::result::Constrained;

    fn result() -> TestResult {
        TestResult {
            statistic: 3.154_558_182_822_2,
            p_value: 0.000_803_706_618_504_3,
            alternative: Alternative::Greater,
            null_value: -0.3,
            variant: Variant::RiskDifference,
            estimate: Some(0.025_974_025_974_025_97),
            constrained: Constrained {
                first: 0.368_464_387_072_768,
                second: 0.668_464_387_072_768,
            },
            standard_error: 0.103_340_5,
        }
    }

    #[test]
    fn significant_digits() {
        assert_eq!(format_significant(3.154_558_182_822_2, 4), "3.155");
        assert_eq!(format_significant(0.000_803_706_6, 3), "0.000804");
        assert_eq!(format_significant(1234.5678, 2), "1235");
        assert_eq!(format_significant(-0.3, 6), "-0.300000");
        assert_eq!(format_significant(1.5e-12, 3), "1.50e-12");
        assert_eq!(format_significant(0.0, 6), "0");
        assert_eq!(format_significant(0.5, 0), "0.5");
    }

    #[test]
    fn json_is_the_serialized_result() {
        let text = render_result(&result(), OutputFormat::Json, 6).unwrap();
        let parsed: TestResult = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.variant, Variant::RiskDifference);
        assert_eq!(parsed.alternative, Alternative::Greater);
        assert!((parsed.statistic - result().statistic).abs() < 1e-12);
        assert!(text.contains("\"p_value\""));
    }

    #[test]
    fn markdown_table_has_rows() {
        let text = render_result(&result(), OutputFormat::Md, 4).unwrap();
        assert!(text.contains("| Field | Value |"));
        assert!(text.contains("| Variant | risk-difference |"));
        assert!(text.contains("| delta | -0.3000 |"));
        assert!(text.contains("| Statistic (z) | 3.155 |"));
        assert!(text.contains("| p-value | 0.0008037 |"));
    }

    #[test]
    fn markdown_marks_undefined_estimate() {
        let mut r = result();
        r.estimate = None;
        let text = render_result(&r, OutputFormat::Md, 4).unwrap();
        assert!(text.contains("| Observed effect | n/a |"));
    }

    #[test]
    fn summary_is_one_line() {
        let text = render_result(&result(), OutputFormat::Summary, 3).unwrap();
        assert_eq!(
            text,
            "risk-difference (delta = -0.300, greater): z = 3.15, p = 0.000804"
        );
    }

    #[test]
    fn error_rendering_by_format() {
        let err = Error::invalid("x1", "events (12) exceed total (10)");
        let json = render_error(&err, OutputFormat::Json, false);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["code"], 10);
        assert_eq!(value["context"]["field"], "x1");

        let human = render_error(&err, OutputFormat::Summary, false);
        assert!(human.contains("Invalid Argument"));
    }
}
