//! Closed-form real roots of low-degree polynomials and admissible-root selection.
//!
//! Constrained likelihood equations reduce to quadratics and cubics whose
//! roots are computed directly (no iteration). Selection is a pure function
//! returning a tagged [`RootSelection`] so estimators can surface a failed
//! selection without unwinding.

use std::f64::consts::PI;

/// Relative slack for treating a slightly negative discriminant as zero.
const DISCRIMINANT_SLACK: f64 = 1e-12;

/// Slack on the trigonometric branch argument before falling back to Cardano.
const TRIG_ARG_SLACK: f64 = 1e-9;

/// Outcome of choosing one root from a candidate set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootSelection {
    /// An admissible root, clamped into the interval.
    Root(f64),
    /// No admissible root; `clamped` is the nearest boundary value.
    Degenerate { clamped: f64 },
}

/// Real roots of `a x² + b x + c`, ascending.
///
/// Uses the cancellation-free form `q = -(b + sign(b) sqrt(disc)) / 2`,
/// roots `q/a` and `c/q`. Falls back to the linear equation when `a == 0`.
/// A double root is reported twice.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let mut disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        let scale = (b * b).max((4.0 * a * c).abs());
        if disc >= -DISCRIMINANT_SLACK * scale {
            disc = 0.0;
        } else {
            return Vec::new();
        }
    }

    let q = -0.5 * (b + disc.sqrt().copysign(b));
    if q == 0.0 {
        // b == 0 and disc == 0, hence c == 0.
        return vec![0.0, 0.0];
    }
    let mut roots = vec![q / a, c / q];
    roots.sort_by(f64::total_cmp);
    roots
}

/// Real roots of `a x³ + b x² + c x + d`, ascending.
///
/// Three real roots come from the trigonometric form of the depressed cubic;
/// a single real root from Cardano's formula. Each root then takes one
/// Newton step, kept only if it lowers the residual. Falls back to
/// [`quadratic_roots`] when `a == 0`.
pub fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a == 0.0 {
        return quadratic_roots(b, c, d);
    }

    let (b, c, d) = (b / a, c / a, d / a);
    // Depressed cubic t³ + p t + q with x = t - b/3.
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let shift = -b / 3.0;

    if p < 0.0 {
        let m = 2.0 * (-p / 3.0).sqrt();
        let arg = 3.0 * q / (p * m);
        if arg.abs() <= 1.0 + TRIG_ARG_SLACK {
            let theta = arg.clamp(-1.0, 1.0).acos() / 3.0;
            let mut roots: Vec<f64> = (0..3)
                .map(|k| m * (theta - 2.0 * PI * k as f64 / 3.0).cos() + shift)
                .map(|x| newton_polish(x, b, c, d))
                .collect();
            roots.sort_by(f64::total_cmp);
            return roots;
        }
    }

    let disc = (q / 2.0).powi(2) + (p / 3.0).powi(3);
    let s = disc.max(0.0).sqrt();
    let u = (-q / 2.0 + s).cbrt();
    let v = (-q / 2.0 - s).cbrt();
    vec![newton_polish(u + v + shift, b, c, d)]
}

/// One Newton step on the monic cubic `x³ + b x² + c x + d`.
fn newton_polish(x: f64, b: f64, c: f64, d: f64) -> f64 {
    let residual = |x: f64| ((x + b) * x + c) * x + d;
    let f = residual(x);
    let slope = (3.0 * x + 2.0 * b) * x + c;
    if f == 0.0 || slope == 0.0 || !slope.is_finite() {
        return x;
    }
    let next = x - f / slope;
    if next.is_finite() && residual(next).abs() < f.abs() {
        next
    } else {
        x
    }
}

/// Roots of a cubic with one root `r` known exactly.
///
/// Divides `(x - r)` out by synthetic division and solves the remaining
/// quadratic in closed form. Near-coincident roots keep full precision this
/// way, where the trigonometric form loses about half the digits.
/// The constant term is implied by `r` and not needed.
pub fn deflate_cubic(a: f64, b: f64, c: f64, r: f64) -> Vec<f64> {
    let qa = a;
    let qb = b + r * qa;
    let qc = c + r * qb;
    let mut roots = quadratic_roots(qa, qb, qc);
    roots.push(r);
    roots.sort_by(f64::total_cmp);
    roots
}

/// Choose the admissible root in `[lo, hi]`.
///
/// Candidates within `tol` of the interval are clamped into it. With several
/// admissible candidates, the one closest to `anchor` wins. With none, the
/// result is [`RootSelection::Degenerate`] holding the boundary nearest to the
/// closest candidate (or the clamped anchor if there are no candidates).
pub fn select_root(roots: &[f64], lo: f64, hi: f64, anchor: f64, tol: f64) -> RootSelection {
    let admissible = roots
        .iter()
        .copied()
        .filter(|r| r.is_finite() && *r >= lo - tol && *r <= hi + tol)
        .map(|r| r.clamp(lo, hi))
        .min_by(|x, y| (x - anchor).abs().total_cmp(&(y - anchor).abs()));

    if let Some(root) = admissible {
        return RootSelection::Root(root);
    }

    let nearest = roots
        .iter()
        .copied()
        .filter(|r| r.is_finite())
        .min_by(|x, y| distance_to(*x, lo, hi).total_cmp(&distance_to(*y, lo, hi)));

    let clamped = match nearest {
        Some(r) => r.clamp(lo, hi),
        None => anchor.clamp(lo, hi),
    };
    RootSelection::Degenerate { clamped }
}

fn distance_to(x: f64, lo: f64, hi: f64) -> f64 {
    if x < lo {
        lo - x
    } else if x > hi {
        x - hi
    } else {
        0.0
    }
}
