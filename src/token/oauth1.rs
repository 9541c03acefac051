use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};

/// An OAuth 1.0a token: either a temporary request token or an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    key: String,
    #[serde(serialize_with = "super::serialize_secret")]
    secret: SecretString,
}

impl Token {
    /// Creates a token from its key and secret.
    pub fn new(key: impl Into<String>, secret: impl Into<SecretString>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Creates a token that has no secret yet, as received in a callback.
    pub fn without_secret(key: impl Into<String>) -> Self {
        Self::new(key, "")
    }

    /// The public token identifier (`oauth_token`).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The token secret (`oauth_token_secret`).
    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub(crate) fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

/// The long-lived token returned by the OAuth 1.0a access-token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth1AccessToken {
    token: Token,
    user_id: Option<String>,
}

impl OAuth1AccessToken {
    pub(crate) fn new(token: Token, user_id: Option<String>) -> Self {
        Self { token, user_id }
    }

    /// The token and its secret, used to sign identity requests.
    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// The provider's user identifier, if the provider returned one.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
