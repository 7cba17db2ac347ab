//! Retry notifications.
//!
//! Observers see one event per scheduled retry, emitted before the wait. They
//! are a side channel only: nothing they do (including panicking) changes how
//! the loop proceeds.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// A retry about to happen.
#[derive(Debug)]
pub struct RetryEvent<'a, E> {
    /// The invocation that just failed (1 = first call of the operation).
    pub attempt: u32,
    /// The failure that triggered the retry.
    pub error: &'a E,
    /// Wait before the next invocation.
    pub delay: Duration,
    /// Name of the strategy in use, if it has one.
    pub strategy: Option<&'a str>,
}

impl<E> Clone for RetryEvent<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for RetryEvent<'_, E> {}

/// Receives retry notifications for operations failing with `E`.
pub trait RetryObserver<E>: Send + Sync {
    fn on_retry(&self, event: &RetryEvent<'_, E>);
}

impl<E, F> RetryObserver<E> for F
where
    F: Fn(&RetryEvent<'_, E>) + Send + Sync,
{
    fn on_retry(&self, event: &RetryEvent<'_, E>) {
        self(event)
    }
}

/// Observer list owned by a policy.
pub(crate) struct Observers<E>(Vec<Arc<dyn RetryObserver<E>>>);

impl<E> Observers<E> {
    pub(crate) fn push(&mut self, observer: Arc<dyn RetryObserver<E>>) {
        self.0.push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Deliver `event` to every observer. A panicking observer is logged and skipped.
    pub(crate) fn notify(&self, event: &RetryEvent<'_, E>) {
        for observer in &self.0 {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| observer.on_retry(event)));
            if delivered.is_err() {
                tracing::warn!(attempt = event.attempt, "retry observer panicked; ignoring");
            }
        }
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<E> Clone for Observers<E> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observers({})", self.0.len())
    }
}
