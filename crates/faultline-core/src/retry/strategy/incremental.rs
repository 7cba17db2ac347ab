//! Linearly increasing backoff.

use std::time::Duration;

use crate::retry::condition::RetryCondition;

/// Waits `initial_interval + increment * attempt` before each retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incremental {
    retry_count: u32,
    initial_interval: Duration,
    increment: Duration,
}

impl Incremental {
    pub fn new(retry_count: u32, initial_interval: Duration, increment: Duration) -> Self {
        Self {
            retry_count,
            initial_interval,
            increment,
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    pub fn increment(&self) -> Duration {
        self.increment
    }

    pub fn next_delay(&self, attempt: u32) -> RetryCondition {
        if attempt >= self.retry_count {
            return RetryCondition::stop();
        }
        let delay = self
            .initial_interval
            .saturating_add(self.increment.saturating_mul(attempt));
        RetryCondition::retry_after(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_delays_differ_by_increment() {
        let s = Incremental::new(6, Duration::from_millis(500), Duration::from_millis(250));
        assert_eq!(s.next_delay(0).delay(), Duration::from_millis(500));
        for attempt in 0..5 {
            let a = s.next_delay(attempt).delay();
            let b = s.next_delay(attempt + 1).delay();
            assert_eq!(b - a, Duration::from_millis(250));
        }
        assert!(!s.next_delay(6).should_retry());
    }

    #[test]
    fn huge_attempt_saturates_instead_of_panicking() {
        let s = Incremental::new(u32::MAX, Duration::MAX, Duration::from_secs(1));
        assert_eq!(s.next_delay(u32::MAX - 1).delay(), Duration::MAX);
    }
}
