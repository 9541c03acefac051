//! Application credentials.

use std::ffi::OsString;

use secrecy::{ExposeSecret as _, SecretString};
use snafu::prelude::*;

/// The application's OAuth identity: the consumer key (OAuth 1.0a) or
/// client ID (OAuth 2.0) and its matching secret.
///
/// Created once when a provider is constructed and never mutated.
#[derive(Debug, Clone)]
pub struct Consumer {
    key: String,
    secret: SecretString,
}

impl Consumer {
    /// Creates a consumer from a key and secret.
    pub fn new(key: impl Into<String>, secret: impl Into<SecretString>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Reads the key and secret from two environment variables.
    ///
    /// Surrounding whitespace is trimmed from both values.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is unset or not valid unicode.
    pub fn from_env(
        key_var: impl Into<OsString>,
        secret_var: impl Into<OsString>,
    ) -> Result<Self, ConsumerFromEnvError> {
        let key = read_var(key_var.into())?;
        let secret = read_var(secret_var.into())?;
        Ok(Self::new(key, secret))
    }

    /// The consumer key / client ID.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The consumer secret / client secret.
    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub(crate) fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

fn read_var(var_name: OsString) -> Result<String, ConsumerFromEnvError> {
    let value = std::env::var(&var_name).context(EnvAccessSnafu { var_name })?;
    Ok(value.trim().to_owned())
}

/// Errors that can occur in [`Consumer::from_env`].
#[derive(Debug, Snafu)]
pub enum ConsumerFromEnvError {
    /// The environment variable was not found or was not valid unicode.
    #[snafu(display("Failed to read env variable '{}'", var_name.to_string_lossy()))]
    EnvAccess {
        /// The name of the variable.
        var_name: OsString,
        /// The underlying lookup error.
        source: std::env::VarError,
    },
}

impl crate::Error for ConsumerFromEnvError {
    fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secret() {
        let consumer = Consumer::new("app-key", "very-secret");
        let debug = format!("{consumer:?}");
        assert!(debug.contains("app-key"));
        assert!(!debug.contains("very-secret"));
        assert_eq!(consumer.expose_secret(), "very-secret");
    }

    #[test]
    fn from_env_reports_missing_variable() {
        let err = Consumer::from_env(
            "SOCIAL_AUTH_TEST_SURELY_UNSET_KEY",
            "SOCIAL_AUTH_TEST_SURELY_UNSET_SECRET",
        )
        .unwrap_err();
        assert!(err.to_string().contains("SOCIAL_AUTH_TEST_SURELY_UNSET_KEY"));
    }
}
