use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use super::classify::{NeverTransient, TransientErrorClassifier};
use super::error::RetryError;
use super::event::{Observers, RetryEvent, RetryObserver};
use super::strategy::RetryStrategy;

/// Binds a backoff strategy to a transient error classifier for operations
/// failing with `E`.
///
/// A policy holds no per-call state: every `execute*` call keeps its own
/// attempt counter, so one policy (e.g. behind an `Arc`) can drive any number
/// of concurrent operations. Without an explicit classifier every failure is
/// treated as permanent.
pub struct RetryPolicy<E, C = NeverTransient> {
    strategy: RetryStrategy,
    classifier: C,
    observers: Observers<E>,
}

impl<E, C: Clone> Clone for RetryPolicy<E, C> {
    fn clone(&self) -> Self {
        Self {
            strategy: self.strategy.clone(),
            classifier: self.classifier.clone(),
            observers: self.observers.clone(),
        }
    }
}

impl<E, C: fmt::Debug> fmt::Debug for RetryPolicy<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("strategy", &self.strategy)
            .field("classifier", &self.classifier)
            .field("observers", &self.observers)
            .finish()
    }
}

/// What the loop does after a failed attempt.
#[derive(Debug)]
pub(crate) enum Step<E> {
    /// Wait this long, then invoke the operation again.
    Retry(Duration),
    /// Terminal failure.
    Stop(RetryError<E>),
}

impl<E> RetryPolicy<E, NeverTransient> {
    /// Policy that treats every failure as permanent until a classifier is supplied.
    pub fn new(strategy: RetryStrategy) -> Self {
        Self::with_classifier(strategy, NeverTransient)
    }

    /// Policy that runs the operation exactly once.
    pub fn no_retry() -> Self {
        Self::new(RetryStrategy::no_retry())
    }
}

impl<E, C> RetryPolicy<E, C> {
    pub fn with_classifier(strategy: RetryStrategy, classifier: C) -> Self {
        Self {
            strategy,
            classifier,
            observers: Observers::default(),
        }
    }

    /// Swap the classifier, keeping strategy and observers.
    pub fn classify_with<D>(self, classifier: D) -> RetryPolicy<E, D> {
        RetryPolicy {
            strategy: self.strategy,
            classifier,
            observers: self.observers,
        }
    }

    /// Attach an observer that is told about every scheduled retry.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: RetryObserver<E> + 'static,
    {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Decide what follows failed invocation number `retries + 1`.
    ///
    /// `retries` is the number of retries already performed and is the
    /// attempt index handed to the strategy. Shared by the blocking and async
    /// loops; only the wait differs between them.
    pub(crate) fn decide(&self, retries: u32, error: E) -> Step<E>
    where
        C: TransientErrorClassifier<E>,
        E: Display,
    {
        let attempts = retries.saturating_add(1);
        let strategy = self.strategy.name();

        if !self.classifier.is_transient(&error) {
            tracing::debug!(attempts, strategy, error = %error, "non-transient failure, not retrying");
            return Step::Stop(RetryError::NonTransient {
                attempts,
                source: error,
            });
        }

        let condition = self.strategy.next_delay(retries, &error);
        if !condition.should_retry() {
            tracing::warn!(attempts, strategy, error = %error, "retries exhausted");
            return Step::Stop(RetryError::Exhausted {
                attempts,
                source: error,
            });
        }

        let delay = condition.delay();
        tracing::debug!(
            attempt = attempts,
            delay_ms = delay.as_millis() as u64,
            strategy,
            error = %error,
            "transient failure, retrying"
        );
        self.observers.notify(&RetryEvent {
            attempt: attempts,
            error: &error,
            delay,
            strategy,
        });
        Step::Retry(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::classify::AlwaysTransient;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fixed(count: u32) -> RetryStrategy {
        RetryStrategy::fixed(count, Duration::from_millis(100))
    }

    #[test]
    fn default_classifier_fails_closed() {
        let p = RetryPolicy::new(fixed(5));
        match p.decide(0, "denied") {
            Step::Stop(RetryError::NonTransient { attempts, source }) => {
                assert_eq!(attempts, 1);
                assert_eq!(source, "denied");
            }
            other => panic!("expected non-transient stop, got {:?}", other),
        }
    }

    #[test]
    fn transient_failure_retries_until_budget() {
        let p = RetryPolicy::with_classifier(fixed(2), AlwaysTransient);
        assert!(matches!(p.decide(0, "t"), Step::Retry(d) if d == Duration::from_millis(100)));
        assert!(matches!(p.decide(1, "t"), Step::Retry(_)));
        assert!(matches!(
            p.decide(2, "t"),
            Step::Stop(RetryError::Exhausted { attempts: 3, .. })
        ));
    }

    #[test]
    fn observers_only_see_scheduled_retries() {
        let seen = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&seen);
        let p = RetryPolicy::with_classifier(fixed(1).named("fixed"), AlwaysTransient).with_observer(
            move |e: &RetryEvent<'_, &str>| {
                assert_eq!(e.strategy, Some("fixed"));
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        assert_eq!(p.observer_count(), 1);
        let _ = p.decide(0, "t");
        let _ = p.decide(1, "t");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn classify_with_keeps_strategy() {
        let p = RetryPolicy::new(fixed(3)).classify_with(|e: &&str| *e == "retry me");
        assert_eq!(p.strategy().retry_count(), 3);
        assert!(matches!(p.decide(0, "retry me"), Step::Retry(_)));
        assert!(matches!(p.decide(0, "nope"), Step::Stop(RetryError::NonTransient { .. })));
    }
}
