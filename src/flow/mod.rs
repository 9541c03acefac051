//! Authorization flows.
//!
//! [`oauth1`] and [`oauth2`] hold the two flow controllers. Both implement
//! [`AuthProvider`], the capability set shared by every provider, and
//! [`ProviderRegistry`] selects one by name from configuration.
//!
//! Fetching the user's identity is provider-specific and left to an
//! [`IdentityResolver`] supplied by the application.

mod callback;
#[cfg(test)]
mod mock;
pub mod oauth1;
pub mod oauth2;
mod registry;
pub mod response;

use http::Uri;

pub use callback::CallbackParams;
pub use registry::{AnyAccessToken, AnyFlowState, AnyProvider, FlowMismatch, ProviderRegistry};

use crate::{
    http::HttpClient,
    platform::{MaybeSend, MaybeSendSync},
};

/// The operations every identity provider supports.
pub trait AuthProvider: MaybeSendSync {
    /// Per-flow state, owned by the caller between redirect and callback.
    type FlowState: MaybeSendSync;

    /// The token a completed flow yields.
    type AccessToken: MaybeSendSync;

    /// The error returned when a step fails with the given client.
    type Error<C: HttpClient>: crate::Error;

    /// The provider's configured name.
    fn name(&self) -> &str;

    /// A fresh flow.
    fn new_flow(&self) -> Self::FlowState;

    /// Returns the URL to send the user to, advancing `flow`.
    fn make_auth_url<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut Self::FlowState,
    ) -> impl Future<Output = Result<Uri, Self::Error<C>>> + MaybeSend;

    /// Completes `flow` from the callback parameters.
    fn exchange_for_token<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut Self::FlowState,
        params: &CallbackParams,
    ) -> impl Future<Output = Result<Self::AccessToken, Self::Error<C>>> + MaybeSend;

    /// Fetches the user's identity with `resolver`.
    fn fetch_identity<C: HttpClient, R: IdentityResolver<Self>>(
        &self,
        http_client: &C,
        resolver: &R,
        token: &Self::AccessToken,
    ) -> impl Future<Output = Result<R::Identity, R::Error<C>>> + MaybeSend
    where
        Self: Sized,
    {
        resolver.resolve(http_client, self, token)
    }
}

/// Maps an access token to the provider's notion of a user.
///
/// Implementations call the provider's API under
/// [`ProviderConfig::base_uri`](crate::config::ProviderConfig::base_uri),
/// signing OAuth 1 calls with
/// [`OAuth1Provider::sign_request`](oauth1::OAuth1Provider::sign_request).
pub trait IdentityResolver<P: AuthProvider>: MaybeSendSync {
    /// The resolved identity.
    type Identity;

    /// The error returned when resolution fails with the given client.
    type Error<C: HttpClient>: crate::Error;

    /// Resolves the identity behind `token`.
    fn resolve<C: HttpClient>(
        &self,
        http_client: &C,
        provider: &P,
        token: &P::AccessToken,
    ) -> impl Future<Output = Result<Self::Identity, Self::Error<C>>> + MaybeSend;
}
