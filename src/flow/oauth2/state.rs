use serde::{Deserialize, Serialize};

use crate::token::AccessToken;

/// Where a single OAuth 2.0 flow stands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "token", rename_all = "snake_case")]
pub enum OAuth2FlowState {
    /// The user has not been sent to the provider.
    #[default]
    Unauthenticated,
    /// The user was sent to the authorize URL.
    AuthorizationPending,
    /// The authorization code was exchanged.
    AccessTokenObtained(AccessToken),
}

impl OAuth2FlowState {
    /// The access token, once the flow has completed.
    #[must_use]
    pub fn access_token(&self) -> Option<&AccessToken> {
        match self {
            Self::AccessTokenObtained(token) => Some(token),
            Self::Unauthenticated | Self::AuthorizationPending => None,
        }
    }
}
