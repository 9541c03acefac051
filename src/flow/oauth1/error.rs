use http::{StatusCode, header::InvalidHeaderValue};
use snafu::Snafu;

use crate::{EndpointUrlError, flow::response::MalformedTokenResponse, signature::SigningError};

/// Errors from an OAuth 1.0a flow step.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum OAuth1Error<HttpReqErr: crate::Error + 'static, HttpRespErr: crate::Error + 'static> {
    /// The outgoing request could not be built.
    #[snafu(display("Failed to prepare token request"))]
    Prepare {
        /// The underlying error.
        source: PrepareRequestError,
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
    /// The token endpoint answered with a status other than 200.
    #[snafu(display("Unexpected response code {status}"))]
    UnexpectedStatusCode {
        /// The status returned by the provider.
        status: StatusCode,
        /// The response body, lossily decoded.
        body: String,
    },
    /// The token endpoint answered 200 without a usable token.
    #[snafu(display("Malformed token response"))]
    MalformedTokenResponse {
        /// The underlying error.
        source: MalformedTokenResponse,
    },
    /// The callback did not carry a required parameter.
    #[snafu(display("Callback is missing '{param}'"))]
    MissingCallbackParameter {
        /// The missing parameter.
        param: &'static str,
    },
    /// The authorize URL could not be built.
    #[snafu(display("Failed to build authorize URL"))]
    AuthorizeUrl {
        /// The underlying error.
        source: EndpointUrlError,
    },
}

impl<HttpReqErr: crate::Error + 'static, HttpRespErr: crate::Error + 'static> crate::Error
    for OAuth1Error<HttpReqErr, HttpRespErr>
{
    fn is_retryable(&self) -> bool {
        match self {
            Self::Request { source } => source.is_retryable(),
            Self::ResponseBody { source } => source.is_retryable(),
            Self::UnexpectedStatusCode { status, .. } => status.is_server_error(),
            Self::Prepare { .. }
            | Self::MalformedTokenResponse { .. }
            | Self::MissingCallbackParameter { .. }
            | Self::AuthorizeUrl { .. } => false,
        }
    }
}

/// Errors building a signed token-endpoint request.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum PrepareRequestError {
    /// The request could not be signed.
    #[snafu(display("Failed to sign request"))]
    Sign {
        /// The underlying error.
        source: SigningError,
    },
    /// The parameters could not be appended to the endpoint's query.
    #[snafu(display("Failed to append query parameters"))]
    AppendQuery {
        /// The underlying error.
        source: EndpointUrlError,
    },
    /// The parameters could not be form-encoded.
    #[snafu(display("Failed to encode request body"))]
    EncodeBody {
        /// The underlying error.
        source: serde_html_form::ser::Error,
    },
    /// The `Authorization` header was not a valid header value.
    #[snafu(display("Invalid Authorization header"))]
    BadHeader {
        /// The underlying error.
        source: InvalidHeaderValue,
    },
}

impl crate::Error for PrepareRequestError {
    fn is_retryable(&self) -> bool {
        false
    }
}
