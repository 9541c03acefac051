//! A validated endpoint URL.
//!
//! [`EndpointUrl`] is a newtype over [`Uri`] that is guaranteed to be
//! absolute (it has a scheme and a host). Provider endpoints are stored as
//! `EndpointUrl`s, which lets the signer derive the RFC 5849 base string URI
//! without re-validating on every request.

use std::fmt;

use http::{Uri, uri::InvalidUri};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use url::Url;

/// A validated, absolute endpoint URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointUrl(Uri);

impl Serialize for EndpointUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for EndpointUrl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.into_endpoint_url().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl EndpointUrl {
    fn from_uri(uri: Uri) -> Result<Self, EndpointUrlError> {
        ensure!(
            uri.scheme().is_some() && uri.host().is_some(),
            NotAbsoluteSnafu {
                uri: uri.to_string()
            }
        );
        Ok(Self(uri))
    }

    /// Returns the inner [`Uri`].
    #[must_use]
    pub fn as_uri(&self) -> &Uri {
        &self.0
    }

    /// Consumes the [`EndpointUrl`] and returns the inner [`Uri`].
    #[must_use]
    pub fn into_uri(self) -> Uri {
        self.0
    }

    /// Returns the URL with `payload` appended to its query string.
    ///
    /// The payload is serialized as `application/x-www-form-urlencoded`. An
    /// existing query on the endpoint is preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be form-encoded.
    pub fn with_query<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Uri, EndpointUrlError> {
        let query = serde_html_form::to_string(payload).context(EncodeQuerySnafu)?;
        if query.is_empty() {
            return Ok(self.0.clone());
        }

        let separator = if self.0.query().is_some() { '&' } else { '?' };
        format!("{}{separator}{query}", self.0)
            .parse()
            .context(InvalidSnafu)
    }

    /// The base string URI of RFC 5849 §3.4.1.2.
    ///
    /// Scheme and host are lowercased, a default port (80 for `http`, 443 for
    /// `https`) is dropped, and the query and fragment are removed.
    #[must_use]
    pub fn normalized(&self) -> String {
        // Both are present: checked on construction.
        let scheme = self.0.scheme_str().unwrap_or_default().to_ascii_lowercase();
        let host = self.0.host().unwrap_or_default().to_ascii_lowercase();

        let port = match (scheme.as_str(), self.0.port_u16()) {
            ("http", Some(80)) | ("https", Some(443)) | (_, None) => String::new(),
            (_, Some(port)) => format!(":{port}"),
        };

        let path = match self.0.path() {
            "" => "/",
            path => path,
        };

        format!("{scheme}://{host}{port}{path}")
    }

    /// Decoded `(name, value)` pairs from the URL's own query string.
    ///
    /// These take part in the signature alongside the request parameters.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .query()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Conversion trait for types that can be turned into an [`EndpointUrl`].
pub trait IntoEndpointUrl {
    /// Attempts to convert this value into an [`EndpointUrl`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid absolute URI.
    fn into_endpoint_url(self) -> Result<EndpointUrl, EndpointUrlError>;
}

impl IntoEndpointUrl for EndpointUrl {
    fn into_endpoint_url(self) -> Result<EndpointUrl, EndpointUrlError> {
        Ok(self)
    }
}

impl IntoEndpointUrl for Uri {
    fn into_endpoint_url(self) -> Result<EndpointUrl, EndpointUrlError> {
        EndpointUrl::from_uri(self)
    }
}

impl IntoEndpointUrl for Url {
    fn into_endpoint_url(self) -> Result<EndpointUrl, EndpointUrlError> {
        self.as_str().into_endpoint_url()
    }
}

impl IntoEndpointUrl for &str {
    fn into_endpoint_url(self) -> Result<EndpointUrl, EndpointUrlError> {
        EndpointUrl::from_uri(self.parse().context(InvalidSnafu)?)
    }
}

impl IntoEndpointUrl for String {
    fn into_endpoint_url(self) -> Result<EndpointUrl, EndpointUrlError> {
        self.as_str().into_endpoint_url()
    }
}

/// Errors produced when building or extending an [`EndpointUrl`].
#[derive(Debug, Snafu)]
pub enum EndpointUrlError {
    /// The value could not be parsed as a URI.
    #[snafu(display("Invalid URI"))]
    Invalid {
        /// The underlying parse error.
        source: InvalidUri,
    },
    /// The URI has no scheme or no host.
    #[snafu(display("Endpoint URI must be absolute: {uri}"))]
    NotAbsolute {
        /// The rejected URI.
        uri: String,
    },
    /// Query parameters could not be form-encoded.
    #[snafu(display("Failed to encode query parameters"))]
    EncodeQuery {
        /// The underlying error.
        source: serde_html_form::ser::Error,
    },
}

impl crate::Error for EndpointUrlError {
    fn is_retryable(&self) -> bool {
        false
    }
}
