//! Score statistic assembly from observed rates and constrained estimates.
//!
//! Each assembler returns `None` when the null variance is not strictly
//! positive and finite: the statistic is undefined for such inputs.

use super::constrained::RateEstimate;

/// Numerator, null variance and standardized statistic of a score test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStatistic {
    pub numerator: f64,
    pub variance: f64,
    pub z: f64,
}

impl ScoreStatistic {
    fn from_parts(numerator: f64, variance: f64) -> Option<Self> {
        if !variance.is_finite() || variance <= 0.0 || !numerator.is_finite() {
            return None;
        }
        Some(Self {
            numerator,
            variance,
            z: numerator / variance.sqrt(),
        })
    }

    /// Standard error of the numerator under the null.
    pub fn standard_error(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Bernoulli variance `p (1 - p) / n`.
fn binomial_variance(p: f64, n: f64) -> f64 {
    p * (1.0 - p) / n
}

/// Score statistic for `H0: p1 - p2 = δ`.
///
/// `z = ((x1/n1 - x2/n2) - δ) / sqrt(p̃1(1-p̃1)/n1 + p̃2(1-p̃2)/n2)`
pub fn difference_score(
    x1: f64,
    n1: f64,
    x2: f64,
    n2: f64,
    delta: f64,
    est: &RateEstimate,
) -> Option<ScoreStatistic> {
    let numerator = (x1 / n1 - x2 / n2) - delta;
    let variance = binomial_variance(est.first, n1) + binomial_variance(est.second, n2);
    ScoreStatistic::from_parts(numerator, variance)
}

/// Score statistic for `H0: p1 / p2 = ρ`.
///
/// `z = (x1/n1 - ρ x2/n2) / sqrt(p̃1(1-p̃1)/n1 + ρ² p̃2(1-p̃2)/n2)`
pub fn ratio_score(
    x1: f64,
    n1: f64,
    x2: f64,
    n2: f64,
    rho: f64,
    est: &RateEstimate,
) -> Option<ScoreStatistic> {
    let numerator = x1 / n1 - rho * x2 / n2;
    let variance =
        binomial_variance(est.first, n1) + rho * rho * binomial_variance(est.second, n2);
    ScoreStatistic::from_parts(numerator, variance)
}

/// Score statistic for the Poisson `H0: r1 / r2 = ρ`.
///
/// The numerator is the excess of observed over expected events in the
/// first group, `x1 - t1 r̃1`. Its variance under the constrained rates is
/// `t1 t2 r̃1 / (t2 + ρ t1)`: the weighted Poisson variance
/// `t1 r̃1 + ρ² t1² r̃2 / t2` scaled by `(t2 / (t2 + ρ t1))²`, the factor
/// the numerator carries relative to `t1 (x1/t1 - ρ x2/t2)`.
pub fn poisson_ratio_score(
    x1: f64,
    t1: f64,
    t2: f64,
    rho: f64,
    est: &RateEstimate,
) -> Option<ScoreStatistic> {
    let numerator = x1 - t1 * est.first;
    let variance = t1 * t2 * est.first / (t2 + rho * t1);
    ScoreStatistic::from_parts(numerator, variance)
}
