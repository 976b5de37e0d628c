//! Group samples: binomial counts and Poisson exposures.

use fm_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Events out of a fixed number of trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSample {
    pub events: u64,
    pub total: u64,
}

impl GroupSample {
    pub fn new(events: u64, total: u64) -> Self {
        Self { events, total }
    }

    /// Count successes in a sequence of outcomes.
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let (events, total) = outcomes
            .into_iter()
            .fold((0u64, 0u64), |(e, t), hit| (e + u64::from(hit), t + 1));
        Self { events, total }
    }

    /// Observed proportion `events / total`.
    pub fn proportion(&self) -> f64 {
        self.events as f64 / self.total as f64
    }

    /// Check `total > 0` and `events <= total`, naming the given fields on failure.
    pub fn validate(&self, events_field: &str, total_field: &str) -> Result<()> {
        if self.total == 0 {
            return Err(Error::invalid(total_field, "total must be positive"));
        }
        if self.events > self.total {
            return Err(Error::invalid(
                events_field,
                format!("events ({}) exceed total ({})", self.events, self.total),
            ));
        }
        Ok(())
    }
}

/// Events observed over an amount of person-time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureSample {
    pub events: u64,
    pub person_time: f64,
}

impl ExposureSample {
    pub fn new(events: u64, person_time: f64) -> Self {
        Self {
            events,
            person_time,
        }
    }

    /// Observed rate `events / person_time`.
    pub fn rate(&self) -> f64 {
        self.events as f64 / self.person_time
    }

    pub fn validate(&self, time_field: &str) -> Result<()> {
        if !self.person_time.is_finite() || self.person_time <= 0.0 {
            return Err(Error::invalid(
                time_field,
                format!(
                    "person-time must be positive and finite, got {}",
                    self.person_time
                ),
            ));
        }
        Ok(())
    }
}
