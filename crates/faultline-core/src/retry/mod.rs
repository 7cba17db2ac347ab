//! Retry and backoff policy.
//!
//! This module encapsulates error classification (transient vs. permanent),
//! backoff strategies (fixed, incremental, exponential with jitter) and the
//! retry loop itself, so that callers wrapping any fallible operation share a
//! consistent policy.

mod classify;
mod condition;
mod error;
mod event;
mod policy;
mod run;
mod strategy;

pub use classify::{
    classify_http_status, classify_io_error, AlwaysTransient, Classify, ErrorKind,
    KindClassifier, NeverTransient, TransientErrorClassifier,
};
pub use condition::RetryCondition;
pub use error::{ConfigError, RetryError};
pub use event::{RetryEvent, RetryObserver};
pub use policy::RetryPolicy;
pub use strategy::{
    Backoff, ExponentialBackoff, FixedInterval, Incremental, RetryStrategy, StrategyOptions,
    DEFAULT_DELTA_BACKOFF, DEFAULT_FIRST_FAST_RETRY, DEFAULT_INITIAL_INTERVAL,
    DEFAULT_MAX_BACKOFF, DEFAULT_MIN_BACKOFF, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_INCREMENT,
    DEFAULT_RETRY_INTERVAL,
};
