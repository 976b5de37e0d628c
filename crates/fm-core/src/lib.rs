//! Farrington-Manning score test for two-sample rate comparisons.
//!
//! Tests a shifted null hypothesis between two groups:
//! - risk difference `p1 - p2 = delta` (non-inferiority / equivalence margins)
//! - risk ratio `p1 / p2 = rho`
//! - Poisson rate ratio `r1 / r2 = rho` over person-time
//!
//! ```
//! use fm_core::{Alternative, GroupSample, ScoreTest};
//!
//! let test = ScoreTest::default();
//! let result = test
//!     .risk_difference(
//!         &GroupSample::new(20, 35),
//!         &GroupSample::new(30, 55),
//!         -0.3,
//!         Alternative::Greater,
//!     )
//!     .unwrap();
//! assert!(result.p_value < 0.001);
//! ```

pub mod adapter;
pub mod config;
pub mod driver;
pub mod exit_codes;
pub mod hypothesis;
pub mod logging;
pub mod output;
pub mod result;
pub mod sample;

pub use adapter::{parse_group, parse_outcomes};
pub use config::{ConfigError, Settings, TestSettings};
pub use driver::{ScoreTest, TestRequest};
pub use hypothesis::{parse_alternative, Alternative, NullHypothesis, Variant};
pub use result::{Constrained, TestResult};
pub use sample::{ExposureSample, GroupSample};

pub use fm_common::{Error, Result};
