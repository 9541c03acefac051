use super::{HttpClient, HttpResponse, TransportOptions};

use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode, Version};

/// Builds a `reqwest::Client` configured according to `options`.
///
/// `reqwest` verifies TLS at the client level, so per-request options can
/// only select the HTTP version; certificate checks (which include the host
/// name) are configured here.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn reqwest_client(options: &TransportOptions) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .gzip(options.accept_gzip)
        .danger_accept_invalid_certs(!options.verify_tls);

    if options.http_version <= Version::HTTP_11 {
        builder = builder.http1_only();
    }

    builder.build()
}

impl HttpClient for reqwest::Client {
    type Response = reqwest::Response;
    type Error = reqwest::Error;

    /// Converts the `http::Request` into a `reqwest::Request` and sends it.
    async fn execute(&self, request: Request<Bytes>) -> Result<Self::Response, Self::Error> {
        let (parts, body) = request.into_parts();
        let mut builder = self
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body);

        if let Some(options) = parts.extensions.get::<TransportOptions>() {
            builder = builder.version(options.http_version);
        }

        reqwest::Client::execute(self, builder.build()?).await
    }
}

impl HttpResponse for reqwest::Response {
    type Error = reqwest::Error;

    fn status(&self) -> StatusCode {
        self.status()
    }

    fn headers(&self) -> HeaderMap {
        self.headers().clone()
    }

    async fn body(self) -> Result<Bytes, Self::Error> {
        self.bytes().await
    }
}

impl crate::Error for reqwest::Error {
    fn is_retryable(&self) -> bool {
        self.is_connect() || self.is_timeout()
    }
}
