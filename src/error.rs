//! The crate-wide [`Error`] trait and [`BoxedError`].
//!
//! Every error returned by a flow controller implements [`Error`], which adds
//! a retry hint on top of [`std::error::Error`]. Transport failures may be
//! retryable; protocol failures (bad status, malformed token response,
//! invalid arguments) never are. The core itself never retries: the caller
//! owns the retry policy and restarts the whole flow step.

use std::convert::Infallible;

use snafu::{AsErrorSource, Snafu};

use crate::platform::MaybeSendSync;

/// Errors that may occur in the library.
pub trait Error: std::error::Error + AsErrorSource + MaybeSendSync + 'static {
    /// If true, repeating the failed flow step from the beginning may succeed.
    fn is_retryable(&self) -> bool;
}

impl Error for Infallible {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// A type-erased [`Error`], for callers that do not want to name the
/// transport's error types.
#[derive(Debug, Snafu)]
#[snafu(transparent)]
pub struct BoxedError {
    source: Box<dyn Error>,
}

impl BoxedError {
    /// Boxes any [`Error`].
    pub fn from_err<E: Error>(err: E) -> Self {
        Self {
            source: Box::new(err),
        }
    }
}

impl Error for BoxedError {
    fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Snafu)]
    #[snafu(display("flaky"))]
    struct Flaky;

    impl Error for Flaky {
        fn is_retryable(&self) -> bool {
            true
        }
    }

    #[test]
    fn boxed_error_keeps_retry_hint() {
        let boxed = BoxedError::from_err(Flaky);
        assert!(boxed.is_retryable());
        assert_eq!(boxed.to_string(), "flaky");
    }
}
