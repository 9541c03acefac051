use serde::{Deserialize, Serialize};

use crate::token::{OAuth1AccessToken, Token};

/// Where a single OAuth 1.0a flow stands.
///
/// Controller operations replace the state only when they succeed, so a
/// failed step can be retried from the same state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "token", rename_all = "snake_case")]
pub enum OAuth1FlowState {
    /// Nothing has been requested yet.
    #[default]
    Unauthenticated,
    /// A request token was issued but the user has not been sent to the
    /// provider.
    RequestTokenObtained(Token),
    /// The user was sent to the authorize URL for this request token.
    AuthorizationPending(Token),
    /// The flow completed.
    AccessTokenObtained(OAuth1AccessToken),
}

impl OAuth1FlowState {
    /// The request token awaiting authorization, if any.
    #[must_use]
    pub fn pending_token(&self) -> Option<&Token> {
        match self {
            Self::RequestTokenObtained(token) | Self::AuthorizationPending(token) => Some(token),
            Self::Unauthenticated | Self::AccessTokenObtained(_) => None,
        }
    }

    /// The access token, once the flow has completed.
    #[must_use]
    pub fn access_token(&self) -> Option<&OAuth1AccessToken> {
        match self {
            Self::AccessTokenObtained(token) => Some(token),
            _ => None,
        }
    }
}
