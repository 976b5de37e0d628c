//! Null hypotheses and test variants.

use clap::ValueEnum;
use fm_common::{Error, Result};
use serde::{Deserialize, Serialize};

pub use fm_math::Alternative;

/// Which two-sample comparison is tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Binomial proportions, `H0: p1 - p2 = delta`.
    #[default]
    RiskDifference,
    /// Binomial proportions, `H0: p1 / p2 = rho`.
    RiskRatio,
    /// Poisson rates over person-time, `H0: r1 / r2 = rho`.
    RateRatio,
}

impl Variant {
    /// Map a "Poisson or not" switch onto the two primary variants.
    pub fn from_poisson(poisson: bool) -> Self {
        if poisson {
            Variant::RateRatio
        } else {
            Variant::RiskDifference
        }
    }

    pub fn is_poisson(self) -> bool {
        self == Variant::RateRatio
    }

    /// Null parameter used when the caller gives none.
    pub fn default_null(self) -> NullHypothesis {
        match self {
            Variant::RiskDifference => NullHypothesis::Difference(0.0),
            Variant::RiskRatio | Variant::RateRatio => NullHypothesis::Ratio(1.0),
        }
    }

    /// Input name of the null parameter (`delta` or `rho`).
    pub fn null_field(self) -> &'static str {
        match self {
            Variant::RiskDifference => "delta",
            Variant::RiskRatio | Variant::RateRatio => "rho",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::RiskDifference => "risk-difference",
            Variant::RiskRatio => "risk-ratio",
            Variant::RateRatio => "rate-ratio",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The hypothesized relation between the two groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "form", content = "value")]
pub enum NullHypothesis {
    /// `p1 - p2 = delta`, `delta` in `(-1, 1)`.
    Difference(f64),
    /// `p1 / p2 = rho` (or `r1 / r2 = rho`), `rho > 0`.
    Ratio(f64),
}

impl NullHypothesis {
    pub fn value(self) -> f64 {
        match self {
            NullHypothesis::Difference(v) | NullHypothesis::Ratio(v) => v,
        }
    }

    /// Binomial variant testing this form.
    pub fn binomial_variant(self) -> Variant {
        match self {
            NullHypothesis::Difference(_) => Variant::RiskDifference,
            NullHypothesis::Ratio(_) => Variant::RiskRatio,
        }
    }

    /// Check the parameter lies in its domain.
    pub fn validate(self) -> Result<()> {
        match self {
            NullHypothesis::Difference(delta) => {
                if !delta.is_finite() || delta <= -1.0 || delta >= 1.0 {
                    return Err(Error::invalid(
                        "delta",
                        format!("must lie strictly between -1 and 1, got {delta}"),
                    ));
                }
            }
            NullHypothesis::Ratio(rho) => {
                if !rho.is_finite() || rho <= 0.0 {
                    return Err(Error::invalid(
                        "rho",
                        format!("must be positive and finite, got {rho}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Parse an alternative name, reporting failures against the `alternative` field.
pub fn parse_alternative(s: &str) -> Result<Alternative> {
    s.parse::<Alternative>()
        .map_err(|message| Error::invalid("alternative", message))
}
