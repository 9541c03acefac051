use http::StatusCode;
use snafu::Snafu;

use crate::{EndpointUrlError, flow::response::InvalidAccessToken};

/// Errors from an OAuth 2.0 flow step.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum OAuth2Error<HttpReqErr: crate::Error + 'static, HttpRespErr: crate::Error + 'static> {
    /// The caller passed an unusable argument.
    #[snafu(display("Invalid argument: {message}"))]
    InvalidArgument {
        /// What was wrong.
        message: &'static str,
    },
    /// The provider redirected back with an `error` instead of a code.
    #[snafu(display("Authorization denied: {error}"))]
    AuthorizationDenied {
        /// The `error` callback parameter.
        error: String,
        /// The `error_description` callback parameter.
        description: Option<String>,
    },
    /// An endpoint URL could not be built.
    #[snafu(display("Failed to build endpoint URL"))]
    BuildUrl {
        /// The underlying error.
        source: EndpointUrlError,
    },
    /// An error occurred when making the HTTP request.
    #[snafu(display("Failed to make HTTP request"))]
    Request {
        /// The underlying error.
        source: HttpReqErr,
    },
    /// There was an error when reading the response body.
    #[snafu(display("Failed to read response body"))]
    ResponseBody {
        /// The underlying error.
        source: HttpRespErr,
    },
    /// The token endpoint answered with a non-success status.
    #[snafu(display("Unexpected response code {status}"))]
    UnexpectedStatusCode {
        /// The status returned by the provider.
        status: StatusCode,
        /// The response body, lossily decoded.
        body: String,
    },
    /// The token endpoint returned no usable access token.
    #[snafu(display("Invalid access token response"))]
    InvalidAccessToken {
        /// The underlying error.
        source: InvalidAccessToken,
    },
}

impl<HttpReqErr: crate::Error + 'static, HttpRespErr: crate::Error + 'static> crate::Error
    for OAuth2Error<HttpReqErr, HttpRespErr>
{
    fn is_retryable(&self) -> bool {
        match self {
            Self::Request { source } => source.is_retryable(),
            Self::ResponseBody { source } => source.is_retryable(),
            Self::UnexpectedStatusCode { status, .. } => status.is_server_error(),
            Self::InvalidArgument { .. }
            | Self::AuthorizationDenied { .. }
            | Self::BuildUrl { .. }
            | Self::InvalidAccessToken { .. } => false,
        }
    }
}
