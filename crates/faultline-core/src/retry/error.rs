//! Error types for strategy construction and the retry loop.

use std::time::Duration;

use thiserror::Error;

/// Invalid strategy or configuration parameters. Raised at construction,
/// never from a running retry loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Exponential backoff requires `min_backoff < max_backoff`.
    #[error("min backoff ({min:?}) must be less than max backoff ({max:?})")]
    InvalidBackoffRange { min: Duration, max: Duration },
    /// A duration in seconds was negative, NaN or infinite.
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { field: String, value: f64 },
    /// A configured retry count does not fit the supported range.
    #[error("retry_count must be between 0 and {max} (got {0})", max = u32::MAX)]
    InvalidRetryCount(i64),
    /// Two strategies were registered under the same name.
    #[error("duplicate retry strategy name: {0}")]
    DuplicateStrategy(String),
    /// A default strategy name that matches no registered strategy.
    #[error("unknown retry strategy: {0}")]
    UnknownStrategy(String),
}

/// Terminal failure of a retry loop.
///
/// Callers receive either the operation's success value or exactly one of
/// these. `attempts` counts operation invocations, including the first.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The strategy stopped retrying; `source` is the last operation error.
    #[error("retries exhausted after {attempts} attempt(s): {source}")]
    Exhausted { attempts: u32, source: E },
    /// The classifier rejected the failure as permanent.
    #[error("non-transient failure on attempt {attempts}: {source}")]
    NonTransient { attempts: u32, source: E },
    /// Cancellation was requested while waiting to retry.
    #[error("retry cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    /// Number of times the operation was invoked.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::NonTransient { attempts, .. }
            | RetryError::Cancelled { attempts } => *attempts,
        }
    }

    /// The wrapped operation error, if the loop did not end by cancellation.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::NonTransient { source, .. } => {
                Some(source)
            }
            RetryError::Cancelled { .. } => None,
        }
    }

    /// Consume the error and return the wrapped operation error, if any.
    pub fn into_inner(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::NonTransient { source, .. } => {
                Some(source)
            }
            RetryError::Cancelled { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    pub fn is_non_transient(&self) -> bool {
        matches!(self, RetryError::NonTransient { .. })
    }
}
