//! Backoff strategies.
//!
//! A strategy is a pure function from `(attempt, last_error)` to a
//! [`RetryCondition`]. The set of variants is closed ([`Backoff`]); options
//! shared by every variant (name, fast first retry) live on [`RetryStrategy`].
//! Strategies are immutable once built and safe to share across threads.

mod exponential;
mod fixed;
mod incremental;

use std::time::Duration;

pub use exponential::ExponentialBackoff;
pub use fixed::FixedInterval;
pub use incremental::Incremental;

use super::condition::RetryCondition;
use super::error::ConfigError;

/// Default retry budget for every variant.
pub const DEFAULT_RETRY_COUNT: u32 = 10;
/// Default wait for [`FixedInterval`].
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);
/// Default first wait for [`Incremental`].
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_secs(1);
/// Default step for [`Incremental`].
pub const DEFAULT_RETRY_INCREMENT: Duration = Duration::from_secs(1);
pub const DEFAULT_MIN_BACKOFF: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);
pub const DEFAULT_DELTA_BACKOFF: Duration = Duration::from_secs(10);
pub const DEFAULT_FIRST_FAST_RETRY: bool = false;

/// Options shared by every strategy variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyOptions {
    /// Optional identifier, used in logs and by the retry manager.
    pub name: Option<String>,
    /// Retry the first failure immediately, ignoring the variant's delay.
    pub first_fast_retry: bool,
}

/// The delay computation of a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    Fixed(FixedInterval),
    Incremental(Incremental),
    ExponentialBackoff(ExponentialBackoff),
}

impl Backoff {
    pub fn retry_count(&self) -> u32 {
        match self {
            Backoff::Fixed(s) => s.retry_count(),
            Backoff::Incremental(s) => s.retry_count(),
            Backoff::ExponentialBackoff(s) => s.retry_count(),
        }
    }

    fn next_delay(&self, attempt: u32) -> RetryCondition {
        match self {
            Backoff::Fixed(s) => s.next_delay(attempt),
            Backoff::Incremental(s) => s.next_delay(attempt),
            Backoff::ExponentialBackoff(s) => s.next_delay(attempt),
        }
    }
}

/// A configured backoff strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryStrategy {
    options: StrategyOptions,
    backoff: Backoff,
}

impl Default for RetryStrategy {
    /// Exponential backoff with the default parameters.
    fn default() -> Self {
        Self::from_backoff(Backoff::ExponentialBackoff(ExponentialBackoff::default()))
    }
}

impl RetryStrategy {
    pub fn from_backoff(backoff: Backoff) -> Self {
        Self {
            options: StrategyOptions {
                name: None,
                first_fast_retry: DEFAULT_FIRST_FAST_RETRY,
            },
            backoff,
        }
    }

    pub fn fixed(retry_count: u32, retry_interval: Duration) -> Self {
        Self::from_backoff(Backoff::Fixed(FixedInterval::new(retry_count, retry_interval)))
    }

    pub fn incremental(retry_count: u32, initial_interval: Duration, increment: Duration) -> Self {
        Self::from_backoff(Backoff::Incremental(Incremental::new(
            retry_count,
            initial_interval,
            increment,
        )))
    }

    pub fn exponential(
        retry_count: u32,
        min_backoff: Duration,
        max_backoff: Duration,
        delta_backoff: Duration,
    ) -> Result<Self, ConfigError> {
        let backoff = ExponentialBackoff::new(retry_count, min_backoff, max_backoff, delta_backoff)?;
        Ok(Self::from_backoff(Backoff::ExponentialBackoff(backoff)))
    }

    /// A strategy that never retries.
    pub fn no_retry() -> Self {
        Self::fixed(0, Duration::ZERO)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    pub fn with_first_fast_retry(mut self, enabled: bool) -> Self {
        self.options.first_fast_retry = enabled;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.options.name.as_deref()
    }

    pub fn first_fast_retry(&self) -> bool {
        self.options.first_fast_retry
    }

    pub fn options(&self) -> &StrategyOptions {
        &self.options
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn retry_count(&self) -> u32 {
        self.backoff.retry_count()
    }

    /// Decide whether retry number `attempt` (0-based) should happen and after
    /// what delay. No variant currently looks at `last_error`.
    pub fn next_delay<E: ?Sized>(&self, attempt: u32, _last_error: &E) -> RetryCondition {
        if self.options.first_fast_retry && attempt == 0 && attempt < self.retry_count() {
            return RetryCondition::retry_now();
        }
        self.backoff.next_delay(attempt)
    }
}
