//! Standard normal tail probabilities and score-test p-values.
//!
//! Both tails go through `erfc` so the upper tail of a large statistic keeps
//! its relative precision instead of collapsing to `1 - 1.0`.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

/// Alternative hypothesis for the score test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    /// `H1: effect != null value`.
    #[default]
    TwoSided,
    /// `H1: effect > null value`.
    Greater,
    /// `H1: effect < null value`.
    Less,
}

impl Alternative {
    pub const ALL: [Alternative; 3] = [Alternative::TwoSided, Alternative::Greater, Alternative::Less];

    pub fn as_str(&self) -> &'static str {
        match self {
            Alternative::TwoSided => "two-sided",
            Alternative::Greater => "greater",
            Alternative::Less => "less",
        }
    }
}

impl std::str::FromStr for Alternative {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "two-sided" | "two.sided" | "two_sided" => Ok(Alternative::TwoSided),
            "greater" => Ok(Alternative::Greater),
            "less" => Ok(Alternative::Less),
            _ => Err(format!(
                "unknown alternative '{}': expected one of two-sided, greater, less",
                s
            )),
        }
    }
}

impl std::fmt::Display for Alternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard normal CDF Φ(z).
pub fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Standard normal survival function 1 - Φ(z).
pub fn std_normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// P-value of a standard normal statistic under the given alternative.
///
/// The two-sided value is `2 * min(Φ(z), 1 - Φ(z))`, capped at 1.
/// NaN propagates.
pub fn p_value(z: f64, alternative: Alternative) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    match alternative {
        Alternative::TwoSided => {
            let tail = std_normal_cdf(z).min(std_normal_sf(z));
            (2.0 * tail).min(1.0)
        }
        Alternative::Greater => std_normal_sf(z),
        Alternative::Less => std_normal_cdf(z),
    }
}
