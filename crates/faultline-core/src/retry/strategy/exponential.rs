//! Exponential backoff with randomized delta.
//!
//! The delay for attempt `n` is `min_backoff + (2^n - 1) * r`, where `r` is
//! drawn uniformly from `[0.8, 1.2] * delta_backoff`, capped at `max_backoff`.
//! Jitter keeps concurrent callers that fail together from retrying in lockstep.

use std::time::Duration;

use rand::Rng;

use crate::retry::condition::RetryCondition;
use crate::retry::error::ConfigError;

use super::{DEFAULT_DELTA_BACKOFF, DEFAULT_MAX_BACKOFF, DEFAULT_MIN_BACKOFF, DEFAULT_RETRY_COUNT};

const JITTER_LOW: f64 = 0.8;
const JITTER_HIGH: f64 = 1.2;

/// Bounded exponential backoff with ±20% jitter on the delta term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialBackoff {
    retry_count: u32,
    min_backoff: Duration,
    max_backoff: Duration,
    delta_backoff: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            min_backoff: DEFAULT_MIN_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            delta_backoff: DEFAULT_DELTA_BACKOFF,
        }
    }
}

impl ExponentialBackoff {
    /// Fails with `ConfigError::InvalidBackoffRange` unless `min_backoff < max_backoff`.
    pub fn new(
        retry_count: u32,
        min_backoff: Duration,
        max_backoff: Duration,
        delta_backoff: Duration,
    ) -> Result<Self, ConfigError> {
        if min_backoff >= max_backoff {
            return Err(ConfigError::InvalidBackoffRange {
                min: min_backoff,
                max: max_backoff,
            });
        }
        Ok(Self {
            retry_count,
            min_backoff,
            max_backoff,
            delta_backoff,
        })
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn min_backoff(&self) -> Duration {
        self.min_backoff
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    pub fn delta_backoff(&self) -> Duration {
        self.delta_backoff
    }

    pub fn next_delay(&self, attempt: u32) -> RetryCondition {
        if attempt >= self.retry_count {
            return RetryCondition::stop();
        }
        let delta_ms = millis(self.delta_backoff);
        // Thread-local generator: concurrent callers never contend on it.
        let multiplier = if delta_ms > 0.0 {
            rand::rng().random_range(delta_ms * JITTER_LOW..=delta_ms * JITTER_HIGH)
        } else {
            0.0
        };
        RetryCondition::retry_after(self.interval_for(attempt, multiplier))
    }

    /// Delay for `attempt` given an already-drawn delta multiplier in milliseconds.
    /// Anything that overflows or exceeds the cap saturates to `max_backoff`.
    fn interval_for(&self, attempt: u32, multiplier_ms: f64) -> Duration {
        let jittered = if multiplier_ms == 0.0 {
            0.0
        } else {
            // 2^1024 is already infinite in f64
            let exp = attempt.min(1024) as i32;
            (2f64.powi(exp) - 1.0) * multiplier_ms
        };
        let interval = millis(self.min_backoff) + jittered;
        let max_ms = millis(self.max_backoff);
        if !interval.is_finite() || interval >= max_ms {
            return self.max_backoff;
        }
        // Whole milliseconds, but never below the configured floor.
        Duration::from_millis(interval as u64).max(self.min_backoff)
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
