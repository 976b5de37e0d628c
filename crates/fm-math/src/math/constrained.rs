//! Constrained maximum-likelihood rate estimates under the null hypothesis.
//!
//! Three null forms are supported:
//! - Risk difference `H0: p1 - p2 = δ` (Farrington & Manning 1990). The
//!   stationarity condition of the binomial log-likelihood along the
//!   constraint is a cubic in `p1`.
//! - Risk ratio `H0: p1 / p2 = ρ`. The stationarity condition is a quadratic in `p2`.
//! - Poisson rate ratio `H0: r1 / r2 = ρ`. Linear, closed form.
//!
//! Counts are `f64` so callers can pass effective counts; integrality is the
//! caller's concern. Every estimator returns `None` for inputs outside its
//! domain and otherwise a tagged [`ConstrainedOutcome`].

use super::roots::{cubic_roots, deflate_cubic, quadratic_roots, select_root, RootSelection};

/// Default slack for accepting a root just outside the admissible interval.
///
/// Near-coincident roots of the likelihood cubic are only resolved to about
/// `sqrt(f64::EPSILON)`, so the slack sits a little above that.
pub const DEFAULT_ROOT_TOLERANCE: f64 = 1e-7;

/// Constrained estimates for the two groups.
///
/// `first`/`second` are proportions for the binomial forms and event rates
/// per unit of person-time for the Poisson form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimate {
    pub first: f64,
    pub second: f64,
}

impl RateEstimate {
    pub fn new(first: f64, second: f64) -> Self {
        Self { first, second }
    }

    /// Common value for both groups (the unconstrained pooled case).
    pub fn pooled(value: f64) -> Self {
        Self {
            first: value,
            second: value,
        }
    }
}

/// Result of a constrained fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstrainedOutcome {
    /// Estimates from an admissible root.
    Estimate(RateEstimate),
    /// No admissible root was found; estimates were clamped to the boundary.
    Degenerate { clamped: RateEstimate },
}

impl ConstrainedOutcome {
    /// The estimates, clamped or not.
    pub fn estimate(&self) -> RateEstimate {
        match *self {
            ConstrainedOutcome::Estimate(e) => e,
            ConstrainedOutcome::Degenerate { clamped } => clamped,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, ConstrainedOutcome::Degenerate { .. })
    }
}

fn valid_binomial(x: f64, n: f64) -> bool {
    x.is_finite() && n.is_finite() && n > 0.0 && x >= 0.0 && x <= n
}

fn valid_poisson(x: f64, t: f64) -> bool {
    x.is_finite() && t.is_finite() && t > 0.0 && x >= 0.0
}

/// Coefficients `(a, b, c, d)` of the risk-difference likelihood cubic in `p1`.
///
/// With `N = n1 + n2` and `X = x1 + x2`:
/// - `a = N`
/// - `b = -(N + X + δ(N + n1))`
/// - `c = n1 δ² + δ(N + 2 x1) + X`
/// - `d = -x1 δ (1 + δ)`
pub fn difference_cubic(x1: f64, n1: f64, x2: f64, n2: f64, delta: f64) -> (f64, f64, f64, f64) {
    let n = n1 + n2;
    let x = x1 + x2;
    let a = n;
    let b = -(n + x + delta * (n + n1));
    let c = n1 * delta * delta + delta * (n + 2.0 * x1) + x;
    let d = -x1 * delta * (1.0 + delta);
    (a, b, c, d)
}

/// Constrained MLE of `(p1, p2)` subject to `p1 - p2 = δ`.
///
/// `δ == 0` returns the pooled proportion `(x1 + x2) / (n1 + n2)` for both
/// groups. Otherwise the likelihood cubic is solved in closed form. When an
/// observed count sits on a boundary (`x1 = 0`, `x2 = 0`, `x1 = n1`,
/// `x2 = n2`) the matching boundary value of `p1` is an exact root and is
/// deflated out first.
///
/// The admissible interval is `max(0, δ) <= p1 <= min(1, 1 + δ)`; among
/// admissible roots the one nearest the constrained pooled value
/// `(X + n2 δ) / N` is chosen.
///
/// Returns `None` unless `n1, n2 > 0`, `0 <= xi <= ni`, and `-1 < δ < 1`.
pub fn difference_mle(
    x1: f64,
    n1: f64,
    x2: f64,
    n2: f64,
    delta: f64,
    tol: f64,
) -> Option<ConstrainedOutcome> {
    if !valid_binomial(x1, n1) || !valid_binomial(x2, n2) {
        return None;
    }
    if !delta.is_finite() || delta <= -1.0 || delta >= 1.0 {
        return None;
    }

    let n = n1 + n2;
    let x = x1 + x2;
    if delta == 0.0 {
        return Some(ConstrainedOutcome::Estimate(RateEstimate::pooled(x / n)));
    }

    let (a, b, c, d) = difference_cubic(x1, n1, x2, n2, delta);
    let roots = if x1 == 0.0 {
        deflate_cubic(a, b, c, 0.0)
    } else if x2 == 0.0 {
        deflate_cubic(a, b, c, delta)
    } else if x1 == n1 {
        deflate_cubic(a, b, c, 1.0)
    } else if x2 == n2 {
        deflate_cubic(a, b, c, 1.0 + delta)
    } else {
        cubic_roots(a, b, c, d)
    };

    let lo = delta.max(0.0);
    let hi = (1.0 + delta).min(1.0);
    let anchor = ((x + n2 * delta) / n).clamp(lo, hi);

    let to_estimate = |p1: f64| RateEstimate::new(p1, (p1 - delta).clamp(0.0, 1.0));
    Some(match select_root(&roots, lo, hi, anchor, tol) {
        RootSelection::Root(p1) => ConstrainedOutcome::Estimate(to_estimate(p1)),
        RootSelection::Degenerate { clamped } => ConstrainedOutcome::Degenerate {
            clamped: to_estimate(clamped),
        },
    })
}

/// Constrained MLE of `(p1, p2)` subject to `p1 / p2 = ρ`.
///
/// `ρ == 1` returns the pooled proportion. Otherwise solves
/// `N ρ p2² - (n1 ρ + x1 + n2 + x2 ρ) p2 + X = 0` on
/// `0 <= p2 <= min(1, 1/ρ)`, preferring the root nearest `X / (n1 ρ + n2)`.
///
/// Returns `None` unless `n1, n2 > 0`, `0 <= xi <= ni`, and `ρ > 0`.
pub fn ratio_mle(
    x1: f64,
    n1: f64,
    x2: f64,
    n2: f64,
    rho: f64,
    tol: f64,
) -> Option<ConstrainedOutcome> {
    if !valid_binomial(x1, n1) || !valid_binomial(x2, n2) {
        return None;
    }
    if !rho.is_finite() || rho <= 0.0 {
        return None;
    }

    let n = n1 + n2;
    let x = x1 + x2;
    if rho == 1.0 {
        return Some(ConstrainedOutcome::Estimate(RateEstimate::pooled(x / n)));
    }

    let a = n * rho;
    let b = -(n1 * rho + x1 + n2 + x2 * rho);
    let roots = quadratic_roots(a, b, x);

    let hi = (1.0 / rho).min(1.0);
    let anchor = (x / (n1 * rho + n2)).clamp(0.0, hi);

    let to_estimate = |p2: f64| RateEstimate::new((rho * p2).clamp(0.0, 1.0), p2);
    Some(match select_root(&roots, 0.0, hi, anchor, tol) {
        RootSelection::Root(p2) => ConstrainedOutcome::Estimate(to_estimate(p2)),
        RootSelection::Degenerate { clamped } => ConstrainedOutcome::Degenerate {
            clamped: to_estimate(clamped),
        },
    })
}

/// Constrained MLE of the Poisson rates `(r1, r2)` subject to `r1 = ρ r2`.
///
/// The likelihood equation is linear: `r2 = (x1 + x2) / (t2 + ρ t1)`.
///
/// Returns `None` unless `t1, t2 > 0`, `x1, x2 >= 0`, and `ρ > 0`.
pub fn poisson_ratio_mle(x1: f64, t1: f64, x2: f64, t2: f64, rho: f64) -> Option<RateEstimate> {
    if !valid_poisson(x1, t1) || !valid_poisson(x2, t2) {
        return None;
    }
    if !rho.is_finite() || rho <= 0.0 {
        return None;
    }
    let r2 = (x1 + x2) / (t2 + rho * t1);
    Some(RateEstimate::new(rho * r2, r2))
}
