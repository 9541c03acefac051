//! The OAuth 2.0 authorization code flow.
//!
//! ```text
//! Unauthenticated ─make_auth_url─▶ AuthorizationPending ─get_access_token─▶ AccessTokenObtained
//! ```

mod error;
mod provider;
mod state;

pub use error::OAuth2Error;
pub use provider::OAuth2Provider;
pub use state::OAuth2FlowState;
