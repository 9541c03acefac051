use std::sync::Arc;

use bon::bon;
use bytes::Bytes;
use http::{
    HeaderMap, HeaderValue, Method, Request, StatusCode, Uri,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use snafu::prelude::*;
use subtle::ConstantTimeEq as _;

use super::{
    OAuth1FlowState,
    error::{
        AppendQuerySnafu, AuthorizeUrlSnafu, BadHeaderSnafu, EncodeBodySnafu,
        MalformedTokenResponseSnafu, MissingCallbackParameterSnafu, OAuth1Error,
        PrepareRequestError, PrepareSnafu, RequestSnafu, ResponseBodySnafu, SignSnafu,
        UnexpectedStatusCodeSnafu,
    },
};
use crate::{
    EndpointUrl, EndpointUrlError,
    config::{ConfigError, MissingRequestTokenUriSnafu, OAuth1Version, Protocol, ProviderConfig},
    credentials::Consumer,
    flow::{
        AuthProvider, CallbackParams,
        response::{parse_access_token_oauth1, parse_request_token},
    },
    http::{HttpClient, HttpResponse, TransportOptions},
    signature::{HmacSha1, OAuthRequest, SignatureMethod, SignedRequest, SigningError},
    token::{OAuth1AccessToken, Token},
};

type FlowResult<T, C> =
    Result<T, OAuth1Error<<C as HttpClient>::Error, <<C as HttpClient>::Response as HttpResponse>::Error>>;

/// An OAuth 1.0a provider.
///
/// Holds the provider's configuration and the application's credentials.
/// Every operation takes the flow's [`OAuth1FlowState`] explicitly, so one
/// provider can serve any number of concurrent flows.
#[derive(Clone)]
pub struct OAuth1Provider {
    config: ProviderConfig,
    consumer: Consumer,
    signature_method: Arc<dyn SignatureMethod>,
    transport: TransportOptions,
    request_headers: HeaderMap,
    request_token_uri: EndpointUrl,
}

impl std::fmt::Debug for OAuth1Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Provider")
            .field("config", &self.config)
            .field("consumer", &self.consumer)
            .field("signature_method", &self.signature_method.name())
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

#[bon]
impl OAuth1Provider {
    /// Creates a provider from its configuration.
    ///
    /// The signature method defaults to [`HmacSha1`] and the transport
    /// options to [`TransportOptions::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is not an OAuth 1 configuration, has no
    /// request-token endpoint, or carries invalid request headers.
    #[builder]
    pub fn new(
        config: ProviderConfig,
        consumer: Consumer,
        signature_method: Option<Arc<dyn SignatureMethod>>,
        #[builder(default)] transport: TransportOptions,
    ) -> Result<Self, ConfigError> {
        config.validate(Protocol::OAuth1)?;
        let request_headers = config.request_headers()?;
        let request_token_uri =
            config
                .request_token_uri
                .clone()
                .context(MissingRequestTokenUriSnafu {
                    provider: &config.name,
                })?;

        Ok(Self {
            config,
            consumer,
            signature_method: signature_method.unwrap_or_else(|| Arc::new(HmacSha1)),
            transport,
            request_headers,
            request_token_uri,
        })
    }
}

impl OAuth1Provider {
    /// The provider's configuration.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The application credentials.
    #[must_use]
    pub fn consumer(&self) -> &Consumer {
        &self.consumer
    }

    /// Obtains a request token (temporary credentials).
    ///
    /// Under OAuth 1.0a the redirect URL is sent as `oauth_callback`. On
    /// success the flow moves to [`OAuth1FlowState::RequestTokenObtained`].
    ///
    /// # Errors
    ///
    /// Fails with [`OAuth1Error::UnexpectedStatusCode`] on any status other
    /// than 200 and [`OAuth1Error::MalformedTokenResponse`] if the body lacks
    /// `oauth_token` or `oauth_token_secret`. The flow state is left as it was.
    pub async fn request_auth_token<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut OAuth1FlowState,
    ) -> FlowResult<Token, C> {
        let callback = (self.config.oauth1_version == OAuth1Version::V1_0a)
            .then(|| ("oauth_callback", self.config.redirect_url()));
        let parameters = self.configured_parameters(callback);

        let body = self
            .call_token_endpoint(http_client, &self.request_token_uri, None, parameters)
            .await?;
        let token = parse_request_token(&body)
            .inspect_err(|err| {
                tracing::warn!(provider = %self.config.name, error = %err, "Malformed request token response");
            })
            .context(MalformedTokenResponseSnafu)?;

        tracing::debug!(provider = %self.config.name, "Obtained request token");
        *flow = OAuth1FlowState::RequestTokenObtained(token.clone());
        Ok(token)
    }

    /// Returns the URL to send the user to.
    ///
    /// Reuses the flow's pending request token, or obtains one first. On
    /// success the flow moves to [`OAuth1FlowState::AuthorizationPending`].
    ///
    /// # Errors
    ///
    /// Returns an error if a request token is needed and cannot be obtained.
    pub async fn make_auth_url<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut OAuth1FlowState,
    ) -> FlowResult<Uri, C> {
        let token = match flow.pending_token() {
            Some(token) => token.clone(),
            None => self.request_auth_token(http_client, flow).await?,
        };

        let url = self.authorize_url(&token).context(AuthorizeUrlSnafu)?;
        *flow = OAuth1FlowState::AuthorizationPending(token);
        Ok(url)
    }

    /// `authorize_uri` with `oauth_token` set to the request token's key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be appended.
    pub fn authorize_url(&self, token: &Token) -> Result<Uri, EndpointUrlError> {
        self.config
            .authorize_uri
            .with_query([("oauth_token", token.key())].as_slice())
    }

    /// Completes the flow from the parameters of the provider's callback.
    ///
    /// The callback's `oauth_token` is matched against the flow's pending
    /// request token. When they match, the request-token secret signs the
    /// exchange; otherwise the token is used with an empty secret.
    ///
    /// # Errors
    ///
    /// Fails with [`OAuth1Error::MissingCallbackParameter`] if `oauth_token`
    /// or `oauth_verifier` is absent, and otherwise as
    /// [`OAuth1Provider::get_access_token`].
    pub async fn get_access_token_by_request_parameters<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut OAuth1FlowState,
        params: &CallbackParams,
    ) -> FlowResult<OAuth1AccessToken, C> {
        let token_key = required(params, "oauth_token")?;
        let verifier = required(params, "oauth_verifier")?;

        let token = match flow.pending_token() {
            Some(pending) if bool::from(pending.key().as_bytes().ct_eq(token_key.as_bytes())) => {
                pending.clone()
            }
            _ => Token::without_secret(token_key),
        };

        self.get_access_token(http_client, flow, &token, verifier)
            .await
    }

    /// Exchanges an authorized request token and its verifier for an access
    /// token.
    ///
    /// The request uses the configured method, parameters and headers, with
    /// `oauth_verifier` added. On success the flow moves to
    /// [`OAuth1FlowState::AccessTokenObtained`].
    ///
    /// # Errors
    ///
    /// Fails with [`OAuth1Error::UnexpectedStatusCode`] on any status other
    /// than 200 and [`OAuth1Error::MalformedTokenResponse`] if the body lacks
    /// `oauth_token` or `oauth_token_secret`. The flow state is left as it was.
    pub async fn get_access_token<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut OAuth1FlowState,
        token: &Token,
        verifier: &str,
    ) -> FlowResult<OAuth1AccessToken, C> {
        let parameters =
            self.configured_parameters(Some(("oauth_verifier", verifier.to_owned())));

        let body = self
            .call_token_endpoint(
                http_client,
                &self.config.access_token_uri,
                Some(token),
                parameters,
            )
            .await?;
        let access_token = parse_access_token_oauth1(&body)
            .inspect_err(|err| {
                tracing::warn!(provider = %self.config.name, error = %err, "Malformed access token response");
            })
            .context(MalformedTokenResponseSnafu)?;

        tracing::debug!(
            provider = %self.config.name,
            user_id = access_token.user_id(),
            "Obtained access token"
        );
        *flow = OAuth1FlowState::AccessTokenObtained(access_token.clone());
        Ok(access_token)
    }

    /// Signs an arbitrary request with this provider's consumer and signature
    /// method, for use by identity resolvers calling the provider's API.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature method fails.
    pub fn sign_request(
        &self,
        method: Method,
        url: &EndpointUrl,
        token: Option<&Token>,
        parameters: Vec<(String, String)>,
    ) -> Result<SignedRequest, SigningError> {
        OAuthRequest::builder()
            .method(method)
            .url(url)
            .consumer(&self.consumer)
            .maybe_token(token)
            .parameters(parameters)
            .build()
            .sign(self.signature_method.as_ref())
    }

    /// The configured parameters plus the flow's own parameter, which replaces
    /// any configured entry of the same name.
    fn configured_parameters(
        &self,
        flow_parameter: Option<(&str, String)>,
    ) -> Vec<(String, String)> {
        let mut parameters = self.config.request_token_parameters.clone();
        if let Some((name, value)) = flow_parameter {
            parameters.insert(name.to_owned(), value);
        }
        parameters.into_iter().collect()
    }

    fn build_request(
        &self,
        url: &EndpointUrl,
        token: Option<&Token>,
        parameters: Vec<(String, String)>,
    ) -> Result<Request<Bytes>, PrepareRequestError> {
        let method = Method::from(self.config.request_token_method);
        let signed = self
            .sign_request(method.clone(), url, token, parameters)
            .context(SignSnafu)?;

        let fields = signed.request_parameters().collect::<Vec<_>>();
        let (uri, body) = if method == Method::GET {
            (
                url.with_query(fields.as_slice()).context(AppendQuerySnafu)?,
                Bytes::new(),
            )
        } else {
            (
                url.as_uri().clone(),
                serde_html_form::to_string(fields.as_slice())
                    .context(EncodeBodySnafu)?
                    .into(),
            )
        };

        let (mut parts, ()) = Request::new(()).into_parts();
        parts.method = method;
        parts.uri = uri;

        parts.headers.insert(
            AUTHORIZATION,
            signed.authorization_header_value().context(BadHeaderSnafu)?,
        );
        parts
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        parts.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        for (name, value) in &self.request_headers {
            parts.headers.insert(name, value.clone());
        }

        let mut request = Request::from_parts(parts, body);
        self.transport.apply(&mut request);
        Ok(request)
    }

    async fn call_token_endpoint<C: HttpClient>(
        &self,
        http_client: &C,
        url: &EndpointUrl,
        token: Option<&Token>,
        parameters: Vec<(String, String)>,
    ) -> FlowResult<Bytes, C> {
        let request = self
            .build_request(url, token, parameters)
            .context(PrepareSnafu)?;

        tracing::debug!(
            provider = %self.config.name,
            method = %request.method(),
            endpoint = %url,
            "Calling OAuth1 token endpoint"
        );

        let response = http_client.execute(request).await.context(RequestSnafu)?;
        let status = response.status();
        let body = response.body().await.context(ResponseBodySnafu)?;

        if status != StatusCode::OK {
            tracing::warn!(
                provider = %self.config.name,
                endpoint = %url,
                %status,
                "OAuth1 token endpoint returned an unexpected status"
            );
            return UnexpectedStatusCodeSnafu {
                status,
                body: String::from_utf8_lossy(&body),
            }
            .fail();
        }

        Ok(body)
    }
}

fn required<'p, ReqErr: crate::Error, RespErr: crate::Error>(
    params: &'p CallbackParams,
    param: &'static str,
) -> Result<&'p str, OAuth1Error<ReqErr, RespErr>> {
    params
        .get(param)
        .filter(|value| !value.is_empty())
        .context(MissingCallbackParameterSnafu { param })
}

impl AuthProvider for OAuth1Provider {
    type FlowState = OAuth1FlowState;
    type AccessToken = OAuth1AccessToken;
    type Error<C: HttpClient> = OAuth1Error<C::Error, <C::Response as HttpResponse>::Error>;

    fn name(&self) -> &str {
        &self.config().name
    }

    fn new_flow(&self) -> OAuth1FlowState {
        OAuth1FlowState::default()
    }

    async fn make_auth_url<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut OAuth1FlowState,
    ) -> Result<Uri, Self::Error<C>> {
        OAuth1Provider::make_auth_url(self, http_client, flow).await
    }

    async fn exchange_for_token<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut OAuth1FlowState,
        params: &CallbackParams,
    ) -> Result<OAuth1AccessToken, Self::Error<C>> {
        self.get_access_token_by_request_parameters(http_client, flow, params)
            .await
    }
}
