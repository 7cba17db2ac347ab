//! Fixed-interval backoff.

use std::time::Duration;

use crate::retry::condition::RetryCondition;

/// Retries up to `retry_count` times, waiting the same interval each time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedInterval {
    retry_count: u32,
    retry_interval: Duration,
}

impl FixedInterval {
    pub fn new(retry_count: u32, retry_interval: Duration) -> Self {
        Self {
            retry_count,
            retry_interval,
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    pub fn next_delay(&self, attempt: u32) -> RetryCondition {
        if attempt < self.retry_count {
            RetryCondition::retry_after(self.retry_interval)
        } else {
            RetryCondition::stop()
        }
    }
}
