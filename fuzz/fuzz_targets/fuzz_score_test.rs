//! Fuzz target for the score test driver.
//!
//! Arbitrary raw requests must produce either a result with a p-value in
//! [0, 1] or a typed error, never a panic or a NaN.

#![no_main]

use arbitrary::Arbitrary;
use fm_core::{Alternative, ScoreTest, TestRequest, Variant};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    variant: u8,
    alternative: u8,
    x1: f64,
    n1: f64,
    x2: f64,
    n2: f64,
    null_value: Option<f64>,
}

fuzz_target!(|input: Input| {
    let variant = match input.variant % 3 {
        0 => Variant::RiskDifference,
        1 => Variant::RiskRatio,
        _ => Variant::RateRatio,
    };
    let alternative = Alternative::ALL[usize::from(input.alternative % 3)];

    let mut request = TestRequest::new(variant, input.x1, input.n1, input.x2, input.n2)
        .with_alternative(alternative);
    request.null_value = input.null_value;

    if let Ok(result) = ScoreTest::default().run(&request) {
        assert!(!result.statistic.is_nan(), "NaN statistic for {:?}", input);
        assert!(
            (0.0..=1.0).contains(&result.p_value),
            "p-value {} out of range for {:?}",
            result.p_value,
            input
        );
    }
});
