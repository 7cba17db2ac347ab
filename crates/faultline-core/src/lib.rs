//! Transient-fault retry engine.
//!
//! Wrap any fallible operation, blocking or async, in a [`RetryPolicy`]: on
//! each failure a classifier decides whether the fault is transient, and a
//! backoff strategy decides whether and when to try again.
//!
//! ```no_run
//! use std::time::Duration;
//! use faultline_core::retry::{KindClassifier, RetryPolicy, RetryStrategy};
//!
//! let policy = RetryPolicy::with_classifier(
//!     RetryStrategy::fixed(3, Duration::from_millis(200)),
//!     KindClassifier,
//! );
//! let data = policy.execute(|| std::fs::read("/mnt/flaky/share/data.bin"));
//! ```

pub mod config;
pub mod control;
pub mod logging;
pub mod manager;
pub mod retry;

pub use control::CancelToken;
pub use manager::RetryManager;
pub use retry::{RetryError, RetryPolicy, RetryStrategy};
