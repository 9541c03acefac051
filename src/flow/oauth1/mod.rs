//! The OAuth 1.0a three-legged flow.
//!
//! ```text
//! Unauthenticated ─request_auth_token─▶ RequestTokenObtained ─make_auth_url─▶ AuthorizationPending
//!                                                                                   │
//!                         AccessTokenObtained ◀─get_access_token_by_request_parameters
//! ```
//!
//! [`OAuth1Provider`] holds only immutable configuration. Each flow keeps its
//! own [`OAuth1FlowState`], which the caller stores between the redirect to
//! the provider and the callback.

mod error;
mod provider;
mod state;

pub use error::{OAuth1Error, PrepareRequestError};
pub use provider::{OAuth1Provider, OAuth1ProviderBuilder};
pub use state::OAuth1FlowState;
