use bon::Builder;
use http::{HeaderValue, Request, Version, header::ACCEPT_ENCODING};

/// Transport settings applied to every OAuth 1.0a token-endpoint call.
///
/// The defaults accept gzip-encoded responses, verify the server's TLS
/// certificate and host name, and speak HTTP/1.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct TransportOptions {
    /// Send `Accept-Encoding: gzip` and expect the client to decode it.
    #[builder(default = true)]
    pub accept_gzip: bool,
    /// Verify the TLS certificate chain and host name.
    #[builder(default = true)]
    pub verify_tls: bool,
    /// The HTTP version to request.
    #[builder(default = Version::HTTP_11)]
    pub http_version: Version,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TransportOptions {
    /// Applies the options to an outgoing request.
    ///
    /// The version and `Accept-Encoding` header are set directly; the options
    /// themselves are stored in the request extensions for the client.
    pub fn apply<B>(self, request: &mut Request<B>) {
        *request.version_mut() = self.http_version;
        if self.accept_gzip {
            request
                .headers_mut()
                .insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        }
        request.extensions_mut().insert(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_gzip_verify_tls_and_http_1_1() {
        let options = TransportOptions::default();
        assert!(options.accept_gzip);
        assert!(options.verify_tls);
        assert_eq!(options.http_version, Version::HTTP_11);
    }

    #[test]
    fn apply_sets_version_header_and_extension() {
        let mut request = Request::new(());
        *request.version_mut() = Version::HTTP_2;

        TransportOptions::default().apply(&mut request);

        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.headers()[ACCEPT_ENCODING], "gzip");
        assert_eq!(
            request.extensions().get::<TransportOptions>(),
            Some(&TransportOptions::default())
        );
    }

    #[test]
    fn gzip_can_be_disabled() {
        let mut request = Request::new(());
        TransportOptions::builder()
            .accept_gzip(false)
            .build()
            .apply(&mut request);
        assert!(request.headers().get(ACCEPT_ENCODING).is_none());
    }
}
