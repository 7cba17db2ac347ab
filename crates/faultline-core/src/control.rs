//! Cancellation for retry loops: a shared abort token.
//!
//! A `CancelToken` is cloned into every retry loop that should stop together.
//! Async waits race the timer against a `tokio_util` cancellation token;
//! blocked threads park on a condvar that `cancel()` signals.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Parking spot for threads blocked in `wait_blocking`.
#[derive(Debug, Default)]
struct Parker {
    lock: Mutex<()>,
    cond: Condvar,
}

/// Cloneable cancellation signal. All clones share one token; once cancelled
/// a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    token: CancellationToken,
    parker: Arc<Parker>,
}

/// Outcome of waiting on a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full delay elapsed.
    Elapsed,
    /// Cancellation was requested before the delay elapsed.
    Cancelled,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Request cancellation and wake every waiter.
    pub fn cancel(&self) {
        {
            // Holding the lock orders the cancel against a blocked waiter's check-then-park.
            let _guard = self.parker.lock.lock().unwrap_or_else(|e| e.into_inner());
            self.token.cancel();
        }
        self.parker.cond.notify_all();
    }

    /// A future that resolves once cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Block the current thread for `delay` or until cancelled, whichever comes first.
    pub fn wait_blocking(&self, delay: Duration) -> WaitOutcome {
        let deadline = Instant::now().checked_add(delay);
        let mut guard = self.parker.lock.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if self.is_cancelled() {
                return WaitOutcome::Cancelled;
            }
            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return WaitOutcome::Elapsed;
                    }
                    deadline - now
                }
                // Delay too large to represent as a deadline: wait in bounded steps.
                None => Duration::from_secs(3600),
            };
            guard = match self.parker.cond.wait_timeout(guard, remaining) {
                Ok((g, _)) => g,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Suspend the current task for `delay` or until cancelled.
    pub async fn wait(&self, delay: Duration) -> WaitOutcome {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => WaitOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => WaitOutcome::Elapsed,
        }
    }
}
