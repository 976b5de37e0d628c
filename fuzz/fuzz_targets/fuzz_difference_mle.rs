//! Fuzz target for the risk-difference constrained estimator.
//!
//! Valid binomial counts with delta strictly inside (-1, 1) must always yield
//! an admissible root that satisfies the null constraint.

#![no_main]

use arbitrary::Arbitrary;
use fm_math::{difference_mle, DEFAULT_ROOT_TOLERANCE};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    x1: u32,
    n1: u32,
    x2: u32,
    n2: u32,
    delta: u32,
}

fuzz_target!(|input: Input| {
    let n1 = f64::from(input.n1 % 100_000 + 1);
    let n2 = f64::from(input.n2 % 100_000 + 1);
    let x1 = f64::from(input.x1) % (n1 + 1.0);
    let x2 = f64::from(input.x2) % (n2 + 1.0);
    // Map onto the open interval (-1, 1).
    let delta = (f64::from(input.delta) + 0.5) / (f64::from(u32::MAX) + 1.0) * 2.0 - 1.0;

    let Some(outcome) = difference_mle(x1, n1, x2, n2, delta, DEFAULT_ROOT_TOLERANCE) else {
        panic!("valid inputs rejected: {:?}", (x1, n1, x2, n2, delta));
    };
    assert!(
        !outcome.is_degenerate(),
        "no admissible root for {:?}",
        (x1, n1, x2, n2, delta)
    );
    let est = outcome.estimate();
    assert!(
        (est.first - est.second - delta).abs() <= 1e-9,
        "constraint violated for {:?}: {:?}",
        (x1, n1, x2, n2, delta),
        est
    );
});
