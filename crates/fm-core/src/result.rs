//! Test result record.

use crate::hypothesis::{Alternative, Variant};
use fm_math::RateEstimate;
use serde::{Deserialize, Serialize};

/// Constrained (null) estimates for the two groups.
///
/// Proportions for the binomial variants, rates per unit person-time for
/// the Poisson variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constrained {
    pub first: f64,
    pub second: f64,
}

impl From<RateEstimate> for Constrained {
    fn from(est: RateEstimate) -> Self {
        Self {
            first: est.first,
            second: est.second,
        }
    }
}

/// Outcome of one score test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Standardized score statistic `z`.
    pub statistic: f64,
    /// P-value in `[0, 1]` for `alternative`.
    pub p_value: f64,
    pub alternative: Alternative,
    /// The `delta` or `rho` tested.
    pub null_value: f64,
    pub variant: Variant,
    /// Observed difference or ratio; absent when undefined (ratio with no
    /// events in the second group).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<f64>,
    pub constrained: Constrained,
    /// Standard error of the score numerator under the null.
    pub standard_error: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TestResult {
        TestResult {
            statistic: 3.154_558_182_822_2,
            p_value: 0.000_803_706_6,
            alternative: Alternative::Greater,
            null_value: -0.3,
            variant: Variant::RiskDifference,
            estimate: Some(20.0 / 35.0 - 30.0 / 55.0),
            constrained: Constrained {
                first: 0.368_464_387_072_768,
                second: 0.668_464_387_072_768,
            },
            standard_error: 0.0,
        }
    }

    #[test]
    fn serializes_required_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        for key in ["statistic", "p_value", "alternative", "null_value"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["alternative"], "greater");
        assert_eq!(value["variant"], "risk-difference");
        assert_eq!(value["null_value"], -0.3);
    }

    #[test]
    fn undefined_estimate_is_omitted() {
        let mut result = sample();
        result.estimate = None;
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("estimate").is_none());
        let back: TestResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.estimate, None);
        assert_eq!(back.variant, Variant::RiskDifference);
    }
}
