use bytes::Bytes;
use http::{
    HeaderMap, HeaderValue, Method, Request, Uri,
    header::{ACCEPT, CONTENT_TYPE},
};
use snafu::prelude::*;

use super::{
    OAuth2FlowState,
    error::{
        AuthorizationDeniedSnafu, BuildUrlSnafu, InvalidAccessTokenSnafu, InvalidArgumentSnafu,
        OAuth2Error, RequestSnafu, ResponseBodySnafu, UnexpectedStatusCodeSnafu,
    },
};
use crate::{
    EndpointUrlError,
    config::{ConfigError, Protocol, ProviderConfig},
    credentials::Consumer,
    flow::{
        AuthProvider, CallbackParams,
        response::{parse_access_token_oauth2, parse_access_token_oauth2_json},
    },
    http::{HttpClient, HttpResponse},
    token::AccessToken,
};

type FlowResult<T, C> =
    Result<T, OAuth2Error<<C as HttpClient>::Error, <<C as HttpClient>::Response as HttpResponse>::Error>>;

/// An OAuth 2.0 provider using the authorization code grant.
///
/// The consumer key and secret are sent as `client_id` and `client_secret`.
#[derive(Debug, Clone)]
pub struct OAuth2Provider {
    config: ProviderConfig,
    consumer: Consumer,
}

impl OAuth2Provider {
    /// Creates a provider from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is not an OAuth 2 configuration.
    pub fn new(config: ProviderConfig, consumer: Consumer) -> Result<Self, ConfigError> {
        config.validate(Protocol::OAuth2)?;
        Ok(Self { config, consumer })
    }

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

    /// The URL to send the user to: `authorize_uri` with `client_id`,
    /// `redirect_uri` and, when scopes are configured, `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be appended.
    pub fn authorization_url(&self) -> Result<Uri, EndpointUrlError> {
        let redirect_uri = self.config.redirect_url();
        let scope = self.config.scope_inline();

        let mut query = vec![
            ("client_id", self.consumer.key()),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        if !scope.is_empty() {
            query.push(("scope", scope.as_str()));
        }

        self.config.authorize_uri.with_query(query.as_slice())
    }

    /// Builds the authorize URL and moves the flow to
    /// [`OAuth2FlowState::AuthorizationPending`]. No request is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be appended.
    pub fn make_auth_url(&self, flow: &mut OAuth2FlowState) -> Result<Uri, EndpointUrlError> {
        let url = self.authorization_url()?;
        *flow = OAuth2FlowState::AuthorizationPending;
        Ok(url)
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// The code, client credentials, `grant_type=authorization_code` and the
    /// redirect URL travel as query parameters of a POST with an empty body.
    /// JSON responses are recognised by their `Content-Type`; anything else
    /// is read as form-encoded.
    ///
    /// # Errors
    ///
    /// Fails with [`OAuth2Error::InvalidArgument`] for an empty code, before
    /// any request is made. Fails with [`OAuth2Error::UnexpectedStatusCode`]
    /// on a non-success status and [`OAuth2Error::InvalidAccessToken`] when
    /// the response has no `access_token`.
    pub async fn get_access_token<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut OAuth2FlowState,
        code: &str,
    ) -> FlowResult<AccessToken, C> {
        ensure!(
            !code.is_empty(),
            InvalidArgumentSnafu {
                message: "authorization code must be a non-empty string",
            }
        );

        let redirect_uri = self.config.redirect_url();
        let uri = self
            .config
            .access_token_uri
            .with_query(
                [
                    ("client_id", self.consumer.key()),
                    ("client_secret", self.consumer.expose_secret()),
                    ("code", code),
                    ("grant_type", "authorization_code"),
                    ("redirect_uri", redirect_uri.as_str()),
                ]
                .as_slice(),
            )
            .context(BuildUrlSnafu)?;

        let (mut parts, ()) = Request::new(()).into_parts();
        parts.method = Method::POST;
        parts.uri = uri;
        parts.headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, application/x-www-form-urlencoded"),
        );

        // The URI carries the client secret.
        tracing::debug!(
            provider = %self.config.name,
            endpoint = %self.config.access_token_uri.normalized(),
            "Exchanging authorization code"
        );

        let response = http_client
            .execute(Request::from_parts(parts, Bytes::new()))
            .await
            .context(RequestSnafu)?;
        let status = response.status();
        let json = is_json(&response.headers());
        let body = response.body().await.context(ResponseBodySnafu)?;

        if !status.is_success() {
            tracing::warn!(
                provider = %self.config.name,
                %status,
                "OAuth2 token endpoint returned an unexpected status"
            );
            return UnexpectedStatusCodeSnafu {
                status,
                body: String::from_utf8_lossy(&body),
            }
            .fail();
        }

        let parsed = if json {
            parse_access_token_oauth2_json(&body)
        } else {
            parse_access_token_oauth2(&body)
        };
        let access_token = parsed
            .inspect_err(|err| {
                tracing::warn!(provider = %self.config.name, error = %err, "Invalid access token response");
            })
            .context(InvalidAccessTokenSnafu)?;

        tracing::debug!(provider = %self.config.name, "Obtained access token");
        *flow = OAuth2FlowState::AccessTokenObtained(access_token.clone());
        Ok(access_token)
    }

    /// Completes the flow from the parameters of the provider's callback.
    ///
    /// # Errors
    ///
    /// Fails with [`OAuth2Error::AuthorizationDenied`] if the callback carries
    /// `error`, and otherwise as [`OAuth2Provider::get_access_token`] with the
    /// callback's `code` (a missing code is an invalid argument).
    pub async fn get_access_token_by_request_parameters<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut OAuth2FlowState,
        params: &CallbackParams,
    ) -> FlowResult<AccessToken, C> {
        if let Some(error) = params.get("error") {
            tracing::warn!(provider = %self.config.name, error, "Authorization denied");
            return AuthorizationDeniedSnafu {
                error,
                description: params.get("error_description").map(ToOwned::to_owned),
            }
            .fail();
        }

        let code = params.get("code").unwrap_or_default();
        self.get_access_token(http_client, flow, code).await
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .is_some_and(|mime| mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json"))
}

impl AuthProvider for OAuth2Provider {
    type FlowState = OAuth2FlowState;
    type AccessToken = AccessToken;
    type Error<C: HttpClient> = OAuth2Error<C::Error, <C::Response as HttpResponse>::Error>;

    fn name(&self) -> &str {
        &self.config().name
    }

    fn new_flow(&self) -> OAuth2FlowState {
        OAuth2FlowState::default()
    }

    async fn make_auth_url<C: HttpClient>(
        &self,
        _http_client: &C,
        flow: &mut OAuth2FlowState,
    ) -> Result<Uri, Self::Error<C>> {
        OAuth2Provider::make_auth_url(self, flow).context(BuildUrlSnafu)
    }

    async fn exchange_for_token<C: HttpClient>(
        &self,
        http_client: &C,
        flow: &mut OAuth2FlowState,
        params: &CallbackParams,
    ) -> Result<AccessToken, Self::Error<C>> {
        self.get_access_token_by_request_parameters(http_client, flow, params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;
    use crate::flow::mock::MockClient;

    fn config() -> ProviderConfig {
        ProviderConfig::builder()
            .name("facebook")
            .protocol(Protocol::OAuth2)
            .base_uri("https://graph.facebook.com/v2.8/")
            .unwrap()
            .authorize_uri("https://www.facebook.com/dialog/oauth")
            .unwrap()
            .access_token_uri("https://graph.facebook.com/oauth/access_token")
            .unwrap()
            .redirect_uri_base("https://app.example.com/auth/cb")
            .scope(["email", "profile"])
            .build()
    }

    fn provider() -> OAuth2Provider {
        OAuth2Provider::new(config(), Consumer::new("abc", "s3cret")).unwrap()
    }

    fn query(uri: &Uri) -> CallbackParams {
        CallbackParams::from_uri(uri)
    }

    #[test]
    fn authorization_url_carries_client_redirect_and_scope() {
        let url = provider().authorization_url().unwrap();

        assert_eq!(url.path(), "/dialog/oauth");
        let raw = url.query().unwrap();
        assert!(raw.contains("client_id=abc"));
        assert!(raw.contains("scope=email%2Cprofile"));
        assert_eq!(
            query(&url).get("redirect_uri"),
            Some("https://app.example.com/auth/cb/facebook/")
        );
    }

    #[test]
    fn empty_scope_is_omitted() {
        let mut config = config();
        config.scope.clear();
        let url = OAuth2Provider::new(config, Consumer::new("abc", "s"))
            .unwrap()
            .authorization_url()
            .unwrap();
        assert_eq!(query(&url).get("scope"), None);
    }

    #[test]
    fn make_auth_url_marks_flow_pending() {
        let mut flow = OAuth2FlowState::default();
        provider().make_auth_url(&mut flow).unwrap();
        assert!(matches!(flow, OAuth2FlowState::AuthorizationPending));
    }

    #[test]
    fn rejects_oauth1_config() {
        let mut config = config();
        config.protocol = Protocol::OAuth1;
        assert!(OAuth2Provider::new(config, Consumer::new("abc", "s")).is_err());
    }

    #[tokio::test]
    async fn empty_code_fails_before_any_request() {
        let client = MockClient::new();
        let mut flow = OAuth2FlowState::AuthorizationPending;

        let err = provider()
            .get_access_token(&client, &mut flow, "")
            .await
            .unwrap_err();

        assert!(matches!(err, OAuth2Error::InvalidArgument { .. }));
        assert!(client.requests().is_empty());
        assert!(matches!(flow, OAuth2FlowState::AuthorizationPending));
    }

    #[tokio::test]
    async fn exchanges_code_with_query_parameters_and_empty_body() {
        let client = MockClient::new().respond(200, "access_token=tok&expires=5183999");
        let mut flow = OAuth2FlowState::AuthorizationPending;

        let token = provider()
            .get_access_token(&client, &mut flow, "the-code")
            .await
            .unwrap();

        assert_eq!(token.expose_secret(), "tok");
        assert!(flow.access_token().is_some());

        let sent = client.last_request();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.uri.path(), "/oauth/access_token");
        assert!(sent.body.is_empty());

        let params = query(&sent.uri);
        assert_eq!(params.get("client_id"), Some("abc"));
        assert_eq!(params.get("client_secret"), Some("s3cret"));
        assert_eq!(params.get("code"), Some("the-code"));
        assert_eq!(params.get("grant_type"), Some("authorization_code"));
        assert_eq!(
            params.get("redirect_uri"),
            Some("https://app.example.com/auth/cb/facebook/")
        );
    }

    #[tokio::test]
    async fn reads_json_token_response() {
        let client = MockClient::new().respond_with(
            200,
            Some("application/json; charset=utf-8"),
            r#"{"access_token":"tok","token_type":"bearer","user_id":"u1"}"#,
        );

        let token = provider()
            .get_access_token(&client, &mut OAuth2FlowState::default(), "code")
            .await
            .unwrap();

        assert_eq!(token.expose_secret(), "tok");
        assert_eq!(token.user_id(), Some("u1"));
    }

    #[tokio::test]
    async fn missing_access_token_is_invalid() {
        let client = MockClient::new().respond(200, "error=bad_verification_code");
        let mut flow = OAuth2FlowState::AuthorizationPending;

        let err = provider()
            .get_access_token(&client, &mut flow, "code")
            .await
            .unwrap_err();

        assert!(matches!(err, OAuth2Error::InvalidAccessToken { .. }));
        assert!(matches!(flow, OAuth2FlowState::AuthorizationPending));
    }

    #[tokio::test]
    async fn error_status_is_surfaced() {
        let client = MockClient::new().respond_with(
            400,
            Some("application/json"),
            r#"{"error":"invalid_grant"}"#,
        );

        let err = provider()
            .get_access_token(&client, &mut OAuth2FlowState::default(), "code")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OAuth2Error::UnexpectedStatusCode { status, .. } if status.as_u16() == 400
        ));
        assert!(!crate::Error::is_retryable(&err));
    }

    #[tokio::test]
    async fn callback_code_is_exchanged() {
        let client = MockClient::new().respond(200, "access_token=tok");
        let params = CallbackParams::from_query("code=xyz&state=ignored");

        provider()
            .get_access_token_by_request_parameters(
                &client,
                &mut OAuth2FlowState::AuthorizationPending,
                &params,
            )
            .await
            .unwrap();

        assert_eq!(query(&client.last_request().uri).get("code"), Some("xyz"));
    }

    #[tokio::test]
    async fn callback_without_code_is_invalid_argument() {
        let client = MockClient::new();
        let err = provider()
            .get_access_token_by_request_parameters(
                &client,
                &mut OAuth2FlowState::AuthorizationPending,
                &CallbackParams::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OAuth2Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn callback_error_is_authorization_denied() {
        let client = MockClient::new();
        let params = CallbackParams::from_query(
            "error=access_denied&error_description=The+user+denied+the+request",
        );

        let err = provider()
            .get_access_token_by_request_parameters(
                &client,
                &mut OAuth2FlowState::AuthorizationPending,
                &params,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OAuth2Error::AuthorizationDenied { error, description }
                if error == "access_denied"
                    && description.as_deref() == Some("The user denied the request")
        ));
        assert!(client.requests().is_empty());
    }
}
