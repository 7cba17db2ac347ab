//! A single retry decision.

use std::time::Duration;

/// Decision returned by a retry strategy after a failure.
///
/// When `should_retry` is false the delay is always zero; callers never sleep
/// on a stop decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryCondition {
    should_retry: bool,
    delay: Duration,
}

impl RetryCondition {
    /// Retry after the given delay.
    pub const fn retry_after(delay: Duration) -> Self {
        Self {
            should_retry: true,
            delay,
        }
    }

    /// Retry immediately.
    pub const fn retry_now() -> Self {
        Self::retry_after(Duration::ZERO)
    }

    /// Do not retry.
    pub const fn stop() -> Self {
        Self {
            should_retry: false,
            delay: Duration::ZERO,
        }
    }

    pub const fn should_retry(&self) -> bool {
        self.should_retry
    }

    /// Delay before the next attempt (zero for a stop decision).
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}
