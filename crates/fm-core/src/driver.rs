//! Score test driver.
//!
//! Validates a request, fits the constrained estimates for its variant,
//! standardizes the score and converts it into a p-value. Every step is a
//! pure function of the request; `ScoreTest` holds only immutable settings
//! and can be shared across threads.

use crate::config::TestSettings;
use crate::hypothesis::{Alternative, NullHypothesis, Variant};
use crate::result::{Constrained, TestResult};
use crate::sample::{ExposureSample, GroupSample};
use fm_common::{Error, Result};
use fm_math::{
    difference_mle, difference_score, p_value, poisson_ratio_mle, poisson_ratio_score, ratio_mle,
    ratio_score, ConstrainedOutcome, RateEstimate, ScoreStatistic,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One test invocation in raw numeric form.
///
/// `n1`/`n2` are trial counts for the binomial variants and person-time for
/// [`Variant::RateRatio`]. A missing `null_value` means `0` for the
/// difference and `1` for the ratios; a missing `alternative` falls back to
/// the driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestRequest {
    pub variant: Variant,
    pub x1: f64,
    pub n1: f64,
    pub x2: f64,
    pub n2: f64,
    #[serde(default)]
    pub null_value: Option<f64>,
    #[serde(default)]
    pub alternative: Option<Alternative>,
}

impl TestRequest {
    pub fn new(variant: Variant, x1: f64, n1: f64, x2: f64, n2: f64) -> Self {
        Self {
            variant,
            x1,
            n1,
            x2,
            n2,
            null_value: None,
            alternative: None,
        }
    }

    /// Request over two binomial samples testing `null`.
    pub fn binomial(first: &GroupSample, second: &GroupSample, null: NullHypothesis) -> Self {
        Self::new(
            null.binomial_variant(),
            first.events as f64,
            first.total as f64,
            second.events as f64,
            second.total as f64,
        )
        .with_null(null.value())
    }

    /// Request over two exposure samples testing `r1 / r2 = rho`.
    pub fn poisson(first: &ExposureSample, second: &ExposureSample, rho: f64) -> Self {
        Self::new(
            Variant::RateRatio,
            first.events as f64,
            first.person_time,
            second.events as f64,
            second.person_time,
        )
        .with_null(rho)
    }

    pub fn with_null(mut self, value: f64) -> Self {
        self.null_value = Some(value);
        self
    }

    pub fn with_alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = Some(alternative);
        self
    }

    /// The null hypothesis this request tests, defaults applied.
    pub fn null_hypothesis(&self) -> NullHypothesis {
        match (self.variant, self.null_value) {
            (Variant::RiskDifference, Some(delta)) => NullHypothesis::Difference(delta),
            (Variant::RiskRatio | Variant::RateRatio, Some(rho)) => NullHypothesis::Ratio(rho),
            (variant, None) => variant.default_null(),
        }
    }

    /// Observed effect on the scale of the null hypothesis.
    fn observed_effect(&self) -> Option<f64> {
        let (r1, r2) = (self.x1 / self.n1, self.x2 / self.n2);
        let effect = match self.variant {
            Variant::RiskDifference => r1 - r2,
            Variant::RiskRatio | Variant::RateRatio => r1 / r2,
        };
        effect.is_finite().then_some(effect)
    }

    fn validate(&self) -> Result<()> {
        if self.variant.is_poisson() {
            validate_count(self.x1, "x1")?;
            validate_person_time(self.n1, "t1")?;
            validate_count(self.x2, "x2")?;
            validate_person_time(self.n2, "t2")?;
        } else {
            validate_binomial(self.x1, self.n1, "x1", "n1")?;
            validate_binomial(self.x2, self.n2, "x2", "n2")?;
        }
        self.null_hypothesis().validate()
    }
}

fn is_whole(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0
}

fn validate_count(x: f64, field: &str) -> Result<()> {
    if !is_whole(x) || x < 0.0 {
        return Err(Error::invalid(
            field,
            format!("events must be a non-negative whole number, got {x}"),
        ));
    }
    Ok(())
}

fn validate_binomial(x: f64, n: f64, events_field: &str, total_field: &str) -> Result<()> {
    validate_count(x, events_field)?;
    if !is_whole(n) || n <= 0.0 {
        return Err(Error::invalid(
            total_field,
            format!("total must be a positive whole number, got {n}"),
        ));
    }
    if x > n {
        return Err(Error::invalid(
            events_field,
            format!("events ({x}) exceed total ({n})"),
        ));
    }
    Ok(())
}

fn validate_person_time(t: f64, field: &str) -> Result<()> {
    ExposureSample::new(0, t).validate(field)
}

/// The Farrington-Manning score test.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreTest {
    settings: TestSettings,
}

impl ScoreTest {
    pub fn new(settings: TestSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }

    /// Run one test.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] naming the offending field for
    ///   out-of-domain inputs.
    /// - [`Error::DegenerateInput`] when the null variance is zero.
    /// - [`Error::NumericalDegeneracy`] when no likelihood root is admissible.
    pub fn run(&self, request: &TestRequest) -> Result<TestResult> {
        request.validate()?;
        let alternative = request.alternative.unwrap_or(self.settings.alternative);
        let null = request.null_hypothesis();

        debug!(
            variant = %request.variant,
            x1 = request.x1,
            n1 = request.n1,
            x2 = request.x2,
            n2 = request.n2,
            null_value = null.value(),
            "fitting constrained estimate"
        );

        let (estimate, stat) = match request.variant {
            Variant::RiskDifference | Variant::RiskRatio => self.fit_binomial(request, null)?,
            Variant::RateRatio => fit_poisson(request, null.value())?,
        };

        let p = p_value(stat.z, alternative);
        debug!(
            variant = %request.variant,
            z = stat.z,
            p_value = p,
            alternative = %alternative,
            "score test complete"
        );

        Ok(TestResult {
            statistic: stat.z,
            p_value: p,
            alternative,
            null_value: null.value(),
            variant: request.variant,
            estimate: request.observed_effect(),
            constrained: Constrained::from(estimate),
            standard_error: stat.standard_error(),
        })
    }

    /// Test `H0: p1 - p2 = delta` on two binomial samples.
    pub fn risk_difference(
        &self,
        first: &GroupSample,
        second: &GroupSample,
        delta: f64,
        alternative: Alternative,
    ) -> Result<TestResult> {
        let request = TestRequest::binomial(first, second, NullHypothesis::Difference(delta))
            .with_alternative(alternative);
        self.run(&request)
    }

    /// Test `H0: p1 / p2 = rho` on two binomial samples.
    pub fn risk_ratio(
        &self,
        first: &GroupSample,
        second: &GroupSample,
        rho: f64,
        alternative: Alternative,
    ) -> Result<TestResult> {
        let request = TestRequest::binomial(first, second, NullHypothesis::Ratio(rho))
            .with_alternative(alternative);
        self.run(&request)
    }

    /// Test `H0: r1 / r2 = rho` on two Poisson exposures.
    pub fn rate_ratio(
        &self,
        first: &ExposureSample,
        second: &ExposureSample,
        rho: f64,
        alternative: Alternative,
    ) -> Result<TestResult> {
        let request = TestRequest::poisson(first, second, rho).with_alternative(alternative);
        self.run(&request)
    }

    /// Test two outcome sequences, reduced to binomial counts.
    pub fn from_outcomes<I, J>(
        &self,
        first: I,
        second: J,
        null: NullHypothesis,
        alternative: Alternative,
    ) -> Result<TestResult>
    where
        I: IntoIterator<Item = bool>,
        J: IntoIterator<Item = bool>,
    {
        let first = GroupSample::from_outcomes(first);
        let second = GroupSample::from_outcomes(second);
        let request = TestRequest::binomial(&first, &second, null).with_alternative(alternative);
        self.run(&request)
    }

    fn fit_binomial(
        &self,
        request: &TestRequest,
        null: NullHypothesis,
    ) -> Result<(RateEstimate, ScoreStatistic)> {
        let TestRequest { x1, n1, x2, n2, .. } = *request;
        let tol = self.settings.root_tolerance;
        let outcome = match null {
            NullHypothesis::Difference(delta) => difference_mle(x1, n1, x2, n2, delta, tol),
            NullHypothesis::Ratio(rho) => ratio_mle(x1, n1, x2, n2, rho, tol),
        }
        .ok_or_else(|| outside_domain(request.variant, null.value()))?;

        let estimate = match outcome {
            ConstrainedOutcome::Estimate(estimate) => estimate,
            ConstrainedOutcome::Degenerate { clamped } => {
                warn!(
                    variant = %request.variant,
                    x1, n1, x2, n2,
                    null_value = null.value(),
                    clamped_first = clamped.first,
                    clamped_second = clamped.second,
                    "no admissible root for the constrained estimate"
                );
                return Err(Error::NumericalDegeneracy(format!(
                    "no admissible root of the {} likelihood equation for \
                     x1={x1}, n1={n1}, x2={x2}, n2={n2}, {}={}; nearest boundary estimate ({}, {})",
                    request.variant,
                    request.variant.null_field(),
                    null.value(),
                    clamped.first,
                    clamped.second,
                )));
            }
        };
        debug!(
            first = estimate.first,
            second = estimate.second,
            "constrained estimate"
        );

        let stat = match null {
            NullHypothesis::Difference(delta) => difference_score(x1, n1, x2, n2, delta, &estimate),
            NullHypothesis::Ratio(rho) => ratio_score(x1, n1, x2, n2, rho, &estimate),
        }
        .ok_or_else(|| zero_variance(&estimate))?;
        Ok((estimate, stat))
    }
}

fn fit_poisson(request: &TestRequest, rho: f64) -> Result<(RateEstimate, ScoreStatistic)> {
    let TestRequest {
        x1,
        n1: t1,
        x2,
        n2: t2,
        ..
    } = *request;
    let estimate = poisson_ratio_mle(x1, t1, x2, t2, rho)
        .ok_or_else(|| outside_domain(Variant::RateRatio, rho))?;
    debug!(
        first = estimate.first,
        second = estimate.second,
        "constrained rates"
    );
    let stat = poisson_ratio_score(x1, t1, t2, rho, &estimate)
        .ok_or_else(|| zero_variance(&estimate))?;
    Ok((estimate, stat))
}

fn outside_domain(variant: Variant, value: f64) -> Error {
    Error::invalid(
        variant.null_field(),
        format!("{value} is outside the domain of the {variant} estimator"),
    )
}

fn zero_variance(estimate: &RateEstimate) -> Error {
    Error::DegenerateInput(format!(
        "null variance is zero at the constrained estimate ({}, {}); the statistic is undefined",
        estimate.first, estimate.second
    ))
}
