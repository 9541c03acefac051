use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// An OAuth 2.0 bearer access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(serialize_with = "super::serialize_secret")]
    token: SecretString,
    user_id: Option<String>,
}

impl AccessToken {
    pub(crate) fn new(token: impl Into<SecretString>, user_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }

    /// The provider's user identifier, if the token response carried one.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

impl ExposeSecret<str> for AccessToken {
    fn expose_secret(&self) -> &str {
        self.token.expose_secret()
    }
}
