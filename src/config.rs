//! Provider endpoint configuration.
//!
//! A [`ProviderConfig`] describes one identity provider: which protocol it
//! speaks, where its endpoints live, and what the application asks for.
//! Configurations are usually deserialized from the application's settings
//! and handed to [`crate::flow::ProviderRegistry`], or built in code with
//! [`ProviderConfig::builder`].

use std::collections::BTreeMap;

use bon::Builder;
use http::{
    HeaderMap, HeaderName, HeaderValue, Method,
    header::{InvalidHeaderName, InvalidHeaderValue},
};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::{EndpointUrl, EndpointUrlError, IntoEndpointUrl};

/// The authorization protocol spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// OAuth 1.0 / 1.0a: request token, authorize, access token.
    OAuth1,
    /// OAuth 2.0 authorization code grant.
    OAuth2,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Protocol::OAuth1 => "oauth1",
            Protocol::OAuth2 => "oauth2",
        })
    }
}

/// The OAuth 1 revision a provider implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OAuth1Version {
    /// OAuth Core 1.0: no `oauth_callback` on the request-token call.
    #[serde(rename = "1.0")]
    V1_0,
    /// OAuth Core 1.0 Revision A: `oauth_callback` is sent with the
    /// request-token call.
    #[default]
    #[serde(rename = "1.0a")]
    V1_0a,
}

/// The HTTP method used for OAuth 1 token-endpoint calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenRequestMethod {
    /// Parameters travel in the query string.
    Get,
    /// Parameters travel in a form-encoded body.
    #[default]
    Post,
}

impl From<TokenRequestMethod> for Method {
    fn from(value: TokenRequestMethod) -> Self {
        match value {
            TokenRequestMethod::Get => Method::GET,
            TokenRequestMethod::Post => Method::POST,
        }
    }
}

/// Endpoints and request settings for a single provider.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(state_mod(name = "builder"))]
pub struct ProviderConfig {
    /// The provider's name. It forms the last segment of the redirect URL.
    #[builder(into)]
    pub name: String,

    /// The protocol spoken by the provider.
    pub protocol: Protocol,

    /// The provider's API base URI, used by identity resolvers.
    #[builder(setters(name = "base_uri_url"))]
    pub base_uri: EndpointUrl,

    /// Where the user is sent to authorize the application.
    #[builder(setters(name = "authorize_uri_url"))]
    pub authorize_uri: EndpointUrl,

    /// The OAuth 1 request-token (temporary credentials) endpoint.
    #[builder(setters(name = "request_token_uri_url"))]
    pub request_token_uri: Option<EndpointUrl>,

    /// The access-token endpoint (OAuth 1) or token endpoint (OAuth 2).
    #[builder(setters(name = "access_token_uri_url"))]
    pub access_token_uri: EndpointUrl,

    /// The application's callback base. See [`ProviderConfig::redirect_url`].
    #[builder(into)]
    pub redirect_uri_base: String,

    /// Requested scopes.
    #[serde(default)]
    #[builder(default, with = |scope: impl IntoIterator<Item = impl Into<String>>| scope.into_iter().map(Into::into).collect())]
    pub scope: Vec<String>,

    /// Requested identity fields.
    #[serde(default)]
    #[builder(default, with = |fields: impl IntoIterator<Item = impl Into<String>>| fields.into_iter().map(Into::into).collect())]
    pub fields: Vec<String>,

    /// The OAuth 1 revision. Ignored for OAuth 2.
    #[serde(default)]
    #[builder(default)]
    pub oauth1_version: OAuth1Version,

    /// The HTTP method for OAuth 1 token-endpoint calls.
    #[serde(default)]
    #[builder(default)]
    pub request_token_method: TokenRequestMethod,

    /// Extra parameters sent with OAuth 1 token-endpoint calls.
    #[serde(default)]
    #[builder(default)]
    pub request_token_parameters: BTreeMap<String, String>,

    /// Extra headers sent with OAuth 1 token-endpoint calls. They replace
    /// generated headers of the same name.
    #[serde(default)]
    #[builder(default)]
    pub request_token_headers: BTreeMap<String, String>,
}

impl ProviderConfig {
    /// The URL the provider redirects back to:
    /// `redirect_uri_base + "/" + name + "/"`.
    #[must_use]
    pub fn redirect_url(&self) -> String {
        format!("{}/{}/", self.redirect_uri_base, self.name)
    }

    /// The scopes joined by `,`.
    #[must_use]
    pub fn scope_inline(&self) -> String {
        self.scope.join(",")
    }

    /// The requested fields joined by `,`.
    #[must_use]
    pub fn fields_inline(&self) -> String {
        self.fields.join(",")
    }

    /// Checks that the configuration is usable for `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the protocol differs, or an OAuth 1 provider has
    /// no request-token endpoint.
    pub fn validate(&self, expected: Protocol) -> Result<(), ConfigError> {
        ensure!(
            self.protocol == expected,
            ProtocolMismatchSnafu {
                provider: &self.name,
                expected,
                actual: self.protocol,
            }
        );
        if expected == Protocol::OAuth1 {
            ensure!(
                self.request_token_uri.is_some(),
                MissingRequestTokenUriSnafu {
                    provider: &self.name
                }
            );
        }
        Ok(())
    }

    /// Converts [`ProviderConfig::request_token_headers`] into a header map.
    ///
    /// # Errors
    ///
    /// Returns an error if a name or value is not a valid HTTP header.
    pub fn request_headers(&self) -> Result<HeaderMap, ConfigError> {
        self.request_token_headers
            .iter()
            .map(|(name, value)| -> Result<_, ConfigError> {
                Ok((
                    HeaderName::try_from(name.as_str())
                        .context(InvalidHeaderNameSnafu { name })?,
                    HeaderValue::try_from(value.as_str())
                        .context(InvalidHeaderValueSnafu { name })?,
                ))
            })
            .collect()
    }
}

impl<S: builder::State> ProviderConfigBuilder<S> {
    /// Sets the base URI from any [`IntoEndpointUrl`] value.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid absolute URI.
    pub fn base_uri<U: IntoEndpointUrl>(
        self,
        url: U,
    ) -> Result<ProviderConfigBuilder<builder::SetBaseUri<S>>, EndpointUrlError>
    where
        S::BaseUri: builder::IsUnset,
    {
        Ok(self.base_uri_url(url.into_endpoint_url()?))
    }

    /// Sets the authorize URI from any [`IntoEndpointUrl`] value.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid absolute URI.
    pub fn authorize_uri<U: IntoEndpointUrl>(
        self,
        url: U,
    ) -> Result<ProviderConfigBuilder<builder::SetAuthorizeUri<S>>, EndpointUrlError>
    where
        S::AuthorizeUri: builder::IsUnset,
    {
        Ok(self.authorize_uri_url(url.into_endpoint_url()?))
    }

    /// Sets the request-token URI from any [`IntoEndpointUrl`] value.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid absolute URI.
    pub fn request_token_uri<U: IntoEndpointUrl>(
        self,
        url: U,
    ) -> Result<ProviderConfigBuilder<builder::SetRequestTokenUri<S>>, EndpointUrlError>
    where
        S::RequestTokenUri: builder::IsUnset,
    {
        Ok(self.request_token_uri_url(url.into_endpoint_url()?))
    }

    /// Sets the access-token URI from any [`IntoEndpointUrl`] value.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid absolute URI.
    pub fn access_token_uri<U: IntoEndpointUrl>(
        self,
        url: U,
    ) -> Result<ProviderConfigBuilder<builder::SetAccessTokenUri<S>>, EndpointUrlError>
    where
        S::AccessTokenUri: builder::IsUnset,
    {
        Ok(self.access_token_uri_url(url.into_endpoint_url()?))
    }
}

/// Errors found while validating a provider configuration.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    /// The configuration is for a different protocol.
    #[snafu(display("Provider '{provider}' is configured for {actual}, expected {expected}"))]
    ProtocolMismatch {
        /// The provider name.
        provider: String,
        /// The protocol required by the caller.
        expected: Protocol,
        /// The configured protocol.
        actual: Protocol,
    },
    /// An OAuth 1 provider has no request-token endpoint.
    #[snafu(display("OAuth1 provider '{provider}' has no request token URI"))]
    MissingRequestTokenUri {
        /// The provider name.
        provider: String,
    },
    /// A configured header name is invalid.
    #[snafu(display("Invalid header name '{name}'"))]
    InvalidHeaderName {
        /// The rejected name.
        name: String,
        /// The underlying error.
        source: InvalidHeaderName,
    },
    /// A configured header value is invalid.
    #[snafu(display("Invalid value for header '{name}'"))]
    InvalidHeaderValue {
        /// The header name.
        name: String,
        /// The underlying error.
        source: InvalidHeaderValue,
    },
    /// Two configurations share a name.
    #[snafu(display("Provider '{provider}' is configured more than once"))]
    DuplicateProvider {
        /// The repeated name.
        provider: String,
    },
}

impl crate::Error for ConfigError {
    fn is_retryable(&self) -> bool {
        false
    }
}
