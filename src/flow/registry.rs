//! Configuration-driven provider lookup.

use std::collections::{HashMap, hash_map::Entry};

use http::Uri;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use super::{
    AuthProvider, CallbackParams,
    oauth1::{OAuth1FlowState, OAuth1Provider},
    oauth2::{OAuth2FlowState, OAuth2Provider},
};
use crate::{
    BoxedError,
    config::{ConfigError, DuplicateProviderSnafu, Protocol, ProviderConfig},
    credentials::Consumer,
    http::HttpClient,
    token::{AccessToken, OAuth1AccessToken},
};

/// A provider of either protocol, selected by its configuration.
#[derive(Debug, Clone)]
pub enum AnyProvider {
    /// An OAuth 1.0a provider.
    OAuth1(OAuth1Provider),
    /// An OAuth 2.0 provider.
    OAuth2(OAuth2Provider),
}

/// The flow state of an [`AnyProvider`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "protocol", content = "flow", rename_all = "lowercase")]
pub enum AnyFlowState {
    /// An OAuth 1.0a flow.
    OAuth1(OAuth1FlowState),
    /// An OAuth 2.0 flow.
    OAuth2(OAuth2FlowState),
}

/// The token yielded by an [`AnyProvider`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "protocol", content = "token", rename_all = "lowercase")]
pub enum AnyAccessToken {
    /// An OAuth 1.0a access token.
    OAuth1(OAuth1AccessToken),
    /// An OAuth 2.0 access token.
    OAuth2(AccessToken),
}

impl AnyProvider {
    /// Builds the provider matching `config.protocol`.
    ///
    /// OAuth 1 providers use the default signature method and transport
    /// options.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid for its protocol.
    pub fn from_config(config: ProviderConfig, consumer: Consumer) -> Result<Self, ConfigError> {
        Ok(match config.protocol {
            Protocol::OAuth1 => Self::OAuth1(
                OAuth1Provider::builder()
                    .config(config)
                    .consumer(consumer)
                    .build()?,
            ),
            Protocol::OAuth2 => Self::OAuth2(OAuth2Provider::new(config, consumer)?),
        })
    }

    /// The provider's configuration.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        match self {
            Self::OAuth1(provider) => provider.config(),
            Self::OAuth2(provider) => provider.config(),
        }
    }

    fn mismatch(&self) -> BoxedError {
        BoxedError::from_err(FlowMismatch {
            provider: self.config().name.clone(),
            protocol: self.config().protocol,
        })
    }
}

impl AuthProvider for AnyProvider {
    type FlowState = AnyFlowState;
    type AccessToken = AnyAccessToken;
    type Error<C: HttpClient> = BoxedError;

    fn name(&self) -> &str {
        &self.config().name
    }

    fn new_flow(&self) -> AnyFlowState {
        match self {
            Self::OAuth1(provider) => AnyFlowState::OAuth1(provider.new_flow()),
            Self::OAuth2(provider) => AnyFlowState::OAuth2(provider.new_flow()),
        }
    }

    async fn make_auth_url<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut AnyFlowState,
    ) -> Result<Uri, BoxedError> {
        match (self, flow) {
            (Self::OAuth1(provider), AnyFlowState::OAuth1(flow)) => {
                AuthProvider::make_auth_url(provider, http_client, flow)
                    .await
                    .map_err(BoxedError::from_err)
            }
            (Self::OAuth2(provider), AnyFlowState::OAuth2(flow)) => {
                AuthProvider::make_auth_url(provider, http_client, flow)
                    .await
                    .map_err(BoxedError::from_err)
            }
            _ => Err(self.mismatch()),
        }
    }

    async fn exchange_for_token<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut AnyFlowState,
        params: &CallbackParams,
    ) -> Result<AnyAccessToken, BoxedError> {
        match (self, flow) {
            (Self::OAuth1(provider), AnyFlowState::OAuth1(flow)) => provider
                .exchange_for_token(http_client, flow, params)
                .await
                .map(AnyAccessToken::OAuth1)
                .map_err(BoxedError::from_err),
            (Self::OAuth2(provider), AnyFlowState::OAuth2(flow)) => provider
                .exchange_for_token(http_client, flow, params)
                .await
                .map(AnyAccessToken::OAuth2)
                .map_err(BoxedError::from_err),
            _ => Err(self.mismatch()),
        }
    }
}

/// A flow state was passed to a provider of the other protocol.
#[derive(Debug, Snafu)]
#[snafu(display("Flow state does not belong to {protocol} provider '{provider}'"))]
pub struct FlowMismatch {
    provider: String,
    protocol: Protocol,
}

impl crate::Error for FlowMismatch {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Providers by name.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, AnyProvider>,
}

impl ProviderRegistry {
    /// Builds a provider for each configuration, paired with its consumer.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration is invalid or two share a name.
    pub fn from_configs(
        configs: impl IntoIterator<Item = (ProviderConfig, Consumer)>,
    ) -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        for (config, consumer) in configs {
            registry.insert(AnyProvider::from_config(config, consumer)?)?;
        }
        Ok(registry)
    }

    /// Adds a provider under its configured name.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider of the same name is already registered.
    pub fn insert(&mut self, provider: AnyProvider) -> Result<(), ConfigError> {
        let name = provider.config().name.clone();
        match self.providers.entry(name) {
            Entry::Occupied(entry) => DuplicateProviderSnafu {
                provider: entry.key(),
            }
            .fail(),
            Entry::Vacant(entry) => {
                entry.insert(provider);
                Ok(())
            }
        }
    }

    /// Looks up a provider by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AnyProvider> {
        self.providers.get(name)
    }

    /// The registered provider names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}
