//! Farrington-Manning score test numerics.
//!
//! Pure functions only: normal tail probabilities, closed-form polynomial
//! roots, constrained maximum-likelihood estimates under the null, and the
//! score statistic built from them.

pub mod math;

pub use math::constrained::{
    difference_cubic, difference_mle, poisson_ratio_mle, ratio_mle, ConstrainedOutcome, RateEstimate,
    DEFAULT_ROOT_TOLERANCE,
};
pub use math::normal::{p_value, std_normal_cdf, std_normal_sf, Alternative};
pub use math::roots::{cubic_roots, deflate_cubic, quadratic_roots, select_root, RootSelection};
pub use math::score::{difference_score, poisson_ratio_score, ratio_score, ScoreStatistic};
