//! Retry loops: run an operation until success or the policy says stop.
//!
//! The blocking and async adapters share the decision step in
//! [`RetryPolicy::decide`]; they differ only in how the operation is invoked
//! and how the wait between attempts is spent.

use std::fmt::Display;
use std::future::Future;

use crate::control::{CancelToken, WaitOutcome};

use super::classify::TransientErrorClassifier;
use super::error::RetryError;
use super::policy::{RetryPolicy, Step};

impl<E, C> RetryPolicy<E, C> {
    /// Runs a closure until it succeeds or the policy says to stop.
    /// On retryable failure, blocks the thread for the backoff delay then tries again.
    pub fn execute<T, F>(&self, op: F) -> Result<T, RetryError<E>>
    where
        C: TransientErrorClassifier<E>,
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        self.execute_with_cancel(&CancelToken::new(), op)
    }

    /// Like [`execute`](Self::execute), but a cancelled `token` ends the loop
    /// at the next (or current) wait with [`RetryError::Cancelled`].
    pub fn execute_with_cancel<T, F>(
        &self,
        token: &CancelToken,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        C: TransientErrorClassifier<E>,
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let mut retries = 0u32;
        loop {
            match op() {
                Ok(value) => {
                    log_success(retries);
                    return Ok(value);
                }
                Err(e) => match self.decide(retries, e) {
                    Step::Stop(err) => return Err(err),
                    Step::Retry(delay) => {
                        if token.wait_blocking(delay) == WaitOutcome::Cancelled {
                            return Err(cancelled(retries));
                        }
                        retries = retries.saturating_add(1);
                    }
                },
            }
        }
    }

    /// Async variant of [`execute`](Self::execute): `op` produces a fresh future
    /// per attempt and waits suspend the task instead of blocking a thread.
    pub async fn execute_async<T, F, Fut>(&self, op: F) -> Result<T, RetryError<E>>
    where
        C: TransientErrorClassifier<E>,
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_async_with_cancel(&CancelToken::new(), op).await
    }

    /// Async variant of [`execute_with_cancel`](Self::execute_with_cancel).
    pub async fn execute_async_with_cancel<T, F, Fut>(
        &self,
        token: &CancelToken,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        C: TransientErrorClassifier<E>,
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retries = 0u32;
        loop {
            match op().await {
                Ok(value) => {
                    log_success(retries);
                    return Ok(value);
                }
                Err(e) => match self.decide(retries, e) {
                    Step::Stop(err) => return Err(err),
                    Step::Retry(delay) => {
                        if token.wait(delay).await == WaitOutcome::Cancelled {
                            return Err(cancelled(retries));
                        }
                        retries = retries.saturating_add(1);
                    }
                },
            }
        }
    }
}

fn log_success(retries: u32) {
    if retries > 0 {
        tracing::info!(retries, "operation succeeded after retrying");
    }
}

fn cancelled<E>(retries: u32) -> RetryError<E> {
    let attempts = retries.saturating_add(1);
    tracing::info!(attempts, "retry loop cancelled while waiting");
    RetryError::Cancelled { attempts }
}
