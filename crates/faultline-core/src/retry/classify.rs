//! Transient error classification.
//!
//! A classifier answers one question about a failure: is it worth retrying?
//! Anything a classifier does not recognise is treated as permanent.

use std::io;

/// Decides whether an operation error is transient.
///
/// Implementations must be stateless (or internally synchronised): one
/// classifier is shared by every concurrent `execute` call on a policy.
pub trait TransientErrorClassifier<E: ?Sized> {
    fn is_transient(&self, error: &E) -> bool;
}

impl<E: ?Sized, F> TransientErrorClassifier<E> for F
where
    F: Fn(&E) -> bool,
{
    fn is_transient(&self, error: &E) -> bool {
        self(error)
    }
}

/// Treats every error as permanent. The default for a policy with no classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverTransient;

impl<E: ?Sized> TransientErrorClassifier<E> for NeverTransient {
    fn is_transient(&self, _error: &E) -> bool {
        false
    }
}

/// Treats every error as transient; retries are bounded only by the strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysTransient;

impl<E: ?Sized> TransientErrorClassifier<E> for AlwaysTransient {
    fn is_transient(&self, _error: &E) -> bool {
        true
    }
}

/// High-level classification of an error for retry purposes.
///
/// This intentionally stays generic; callers can map HTTP status codes,
/// IO failures or their own error types into these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, refused, broken pipe).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Any other error (not retried).
    Other,
}

impl ErrorKind {
    pub fn is_transient(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

/// Errors that can report their own [`ErrorKind`].
pub trait Classify {
    fn error_kind(&self) -> ErrorKind;
}

impl Classify for io::Error {
    fn error_kind(&self) -> ErrorKind {
        classify_io_error(self.kind())
    }
}

impl Classify for ErrorKind {
    fn error_kind(&self) -> ErrorKind {
        *self
    }
}

/// Classifier for any error implementing [`Classify`]: timeouts, throttling,
/// connection failures and 5xx responses are transient.
#[derive(Debug, Clone, Copy, Default)]
pub struct KindClassifier;

impl<E: Classify + ?Sized> TransientErrorClassifier<E> for KindClassifier {
    fn is_transient(&self, error: &E) -> bool {
        error.error_kind().is_transient()
    }
}

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u16) -> ErrorKind {
    match code {
        408 => ErrorKind::Timeout,
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code),
        _ => ErrorKind::Other,
    }
}

/// Classify an IO error kind for retry decisions.
pub fn classify_io_error(kind: io::ErrorKind) -> ErrorKind {
    match kind {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ErrorKind::Timeout,
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::NotConnected
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::Interrupted
        | io::ErrorKind::UnexpectedEof => ErrorKind::Connection,
        _ => ErrorKind::Other,
    }
}
