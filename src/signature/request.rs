use bon::Builder;
use http::{HeaderValue, Method, header::InvalidHeaderValue};
use rand::RngCore as _;

use crate::{
    EndpointUrl,
    credentials::Consumer,
    platform::unix_timestamp,
    signature::{OAUTH_VERSION, SignatureMethod, SigningError, base_string, percent_encode},
    token::Token,
};

const NONCE_BYTES: usize = 16;

fn is_protocol_parameter(name: &str) -> bool {
    name.starts_with("oauth_")
}

/// An outbound request awaiting its OAuth 1.0a signature.
///
/// `nonce` and `timestamp` are generated when not set. Fixing both makes the
/// signature reproducible.
#[derive(Debug, Clone, Builder)]
pub struct OAuthRequest<'a> {
    /// The HTTP method.
    method: Method,
    /// The target endpoint. Its query string takes part in the signature.
    url: &'a EndpointUrl,
    /// The application credentials.
    consumer: &'a Consumer,
    /// The request or access token, absent when requesting a request token.
    token: Option<&'a Token>,
    /// Caller-supplied parameters, such as `oauth_callback`, `oauth_verifier`
    /// or form fields.
    #[builder(default)]
    parameters: Vec<(String, String)>,
    /// The `oauth_nonce` to use.
    #[builder(into)]
    nonce: Option<String>,
    /// The `oauth_timestamp` to use, in seconds since the Unix epoch.
    timestamp: Option<u64>,
}

impl OAuthRequest<'_> {
    /// Signs the request with `signature_method`.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature method fails.
    pub fn sign<M: SignatureMethod + ?Sized>(
        self,
        signature_method: &M,
    ) -> Result<SignedRequest, SigningError> {
        let nonce = self.nonce.unwrap_or_else(generate_nonce);
        let timestamp = self.timestamp.unwrap_or_else(unix_timestamp).to_string();

        let mut protocol = vec![(
            "oauth_consumer_key".to_owned(),
            self.consumer.key().to_owned(),
        )];
        if let Some(token) = self.token.filter(|token| !token.key().is_empty()) {
            protocol.push(("oauth_token".to_owned(), token.key().to_owned()));
        }
        protocol.extend([
            (
                "oauth_signature_method".to_owned(),
                signature_method.name().to_owned(),
            ),
            ("oauth_timestamp".to_owned(), timestamp),
            ("oauth_nonce".to_owned(), nonce),
            ("oauth_version".to_owned(), OAUTH_VERSION.to_owned()),
        ]);

        let signed_parameters = protocol
            .iter()
            .chain(&self.parameters)
            .filter(|(name, _)| name != "oauth_signature")
            .cloned()
            .collect::<Vec<_>>();
        let base_string = base_string(&self.method, self.url, &signed_parameters);

        let signature = signature_method.sign(
            &base_string,
            self.consumer.expose_secret(),
            self.token.map_or("", Token::expose_secret),
        )?;

        let signature_position = protocol
            .iter()
            .position(|(name, _)| name == "oauth_signature_method")
            .map_or(protocol.len(), |position| position + 1);
        protocol.insert(
            signature_position,
            ("oauth_signature".to_owned(), signature.clone()),
        );

        Ok(SignedRequest {
            method: self.method,
            url: self.url.clone(),
            base_string,
            signature,
            protocol,
            parameters: self
                .parameters
                .into_iter()
                .filter(|(name, _)| name != "oauth_signature")
                .collect(),
        })
    }
}

/// A signed OAuth 1.0a request.
///
/// Lives for the duration of one outbound call.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    url: EndpointUrl,
    base_string: String,
    signature: String,
    protocol: Vec<(String, String)>,
    parameters: Vec<(String, String)>,
}

impl SignedRequest {
    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The target endpoint.
    #[must_use]
    pub fn url(&self) -> &EndpointUrl {
        &self.url
    }

    /// The signature base string that was signed.
    #[must_use]
    pub fn base_string(&self) -> &str {
        &self.base_string
    }

    /// The computed `oauth_signature`.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Every parameter of the request, including `oauth_signature`.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.protocol
            .iter()
            .chain(&self.parameters)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The `oauth_*` parameters carried in the `Authorization` header.
    pub fn oauth_parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters()
            .filter(|(name, _)| is_protocol_parameter(name))
    }

    /// The remaining parameters, sent in the query string or form body.
    pub fn request_parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters
            .iter()
            .filter(|(name, _)| !is_protocol_parameter(name))
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The `Authorization` header value (RFC 5849 §3.5.1).
    ///
    /// ```text
    /// OAuth oauth_consumer_key="...", oauth_token="...", oauth_signature_method="HMAC-SHA1", ...
    /// ```
    #[must_use]
    pub fn authorization_header(&self) -> String {
        let fields = self
            .oauth_parameters()
            .map(|(name, value)| format!("{}=\"{}\"", percent_encode(name), percent_encode(value)))
            .collect::<Vec<_>>();
        format!("OAuth {}", fields.join(", "))
    }

    /// The `Authorization` header as an [`HeaderValue`].
    ///
    /// # Errors
    ///
    /// Never fails in practice: every field is percent-encoded ASCII.
    pub fn authorization_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.authorization_header())
    }
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IntoEndpointUrl as _, signature::HmacSha1};

    fn photos_request<'a>(
        url: &'a EndpointUrl,
        consumer: &'a Consumer,
        token: &'a Token,
        parameters: Vec<(String, String)>,
    ) -> SignedRequest {
        OAuthRequest::builder()
            .method(Method::GET)
            .url(url)
            .consumer(consumer)
            .token(token)
            .parameters(parameters)
            .nonce("kllo9940pd9333jh")
            .timestamp(1_191_242_096)
            .build()
            .sign(&HmacSha1)
            .unwrap()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn signs_oauth_core_appendix_request() {
        let url = "http://photos.example.net/photos".into_endpoint_url().unwrap();
        let consumer = Consumer::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let token = Token::new("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");

        let signed = photos_request(
            &url,
            &consumer,
            &token,
            pairs(&[("file", "vacation.jpg"), ("size", "original")]),
        );

        assert_eq!(signed.signature(), "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");
        assert_eq!(
            signed.authorization_header(),
            "OAuth oauth_consumer_key=\"dpf43f3p2l4k3l03\", oauth_token=\"nnch734d00sl2jdk\", \
             oauth_signature_method=\"HMAC-SHA1\", oauth_signature=\"tR3%2BTy81lMeYAr%2FFid0kMTYa%2FWM%3D\", \
             oauth_timestamp=\"1191242096\", oauth_nonce=\"kllo9940pd9333jh\", oauth_version=\"1.0\""
        );
        assert_eq!(
            signed.request_parameters().collect::<Vec<_>>(),
            vec![("file", "vacation.jpg"), ("size", "original")]
        );
    }

    #[test]
    fn query_parameters_on_the_url_are_signed() {
        let consumer = Consumer::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let token = Token::new("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let url = "http://photos.example.net/photos?file=vacation.jpg&size=original"
            .into_endpoint_url()
            .unwrap();

        let signed = photos_request(&url, &consumer, &token, Vec::new());
        assert_eq!(signed.signature(), "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");
    }

    #[test]
    fn signature_is_independent_of_parameter_order() {
        let url = "http://photos.example.net/photos".into_endpoint_url().unwrap();
        let consumer = Consumer::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let token = Token::new("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");

        let forward = photos_request(
            &url,
            &consumer,
            &token,
            pairs(&[("file", "vacation.jpg"), ("size", "original")]),
        );
        let backward = photos_request(
            &url,
            &consumer,
            &token,
            pairs(&[("size", "original"), ("file", "vacation.jpg")]),
        );

        assert_eq!(forward.base_string(), backward.base_string());
        assert_eq!(forward.signature(), backward.signature());
    }

    /// The signed request walkthrough from the Twitter developer documentation.
    #[test]
    fn signs_twitter_documentation_example() {
        let url = "https://api.twitter.com/1.1/statuses/update.json?include_entities=true"
            .into_endpoint_url()
            .unwrap();
        let consumer = Consumer::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        );
        let token = Token::new(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );

        let signed = OAuthRequest::builder()
            .method(Method::POST)
            .url(&url)
            .consumer(&consumer)
            .token(&token)
            .parameters(pairs(&[(
                "status",
                "Hello Ladies + Gentlemen, a signed OAuth request!",
            )]))
            .nonce("kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg")
            .timestamp(1_318_622_958)
            .build()
            .sign(&HmacSha1)
            .unwrap();

        assert_eq!(signed.signature(), "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    /// Twitter's "Implementing Sign in with Twitter" request-token example.
    #[test]
    fn request_token_call_omits_token_and_signs_with_empty_secret() {
        let url = "https://api.twitter.com/oauth/request_token"
            .into_endpoint_url()
            .unwrap();
        let consumer = Consumer::new(
            "cChZNFj6T5R0TigYB9yd1w",
            "L8qq9PZyRg6ieKGEKhZolGC0vJWLw8iEJ88DRdyOg",
        );

        let signed = OAuthRequest::builder()
            .method(Method::POST)
            .url(&url)
            .consumer(&consumer)
            .parameters(pairs(&[(
                "oauth_callback",
                "http://localhost/sign-in-with-twitter/",
            )]))
            .nonce("ea9ec8429b68d6b77cd5600adbbb0456")
            .timestamp(1_318_467_427)
            .build()
            .sign(&HmacSha1)
            .unwrap();

        assert_eq!(signed.signature(), "F1Li3tvehgcraF8DMJ7OyxO4w9Y=");
        assert!(!signed.authorization_header().contains("oauth_token="));
        assert!(
            signed
                .authorization_header()
                .ends_with("oauth_callback=\"http%3A%2F%2Flocalhost%2Fsign-in-with-twitter%2F\"")
        );
        assert_eq!(signed.request_parameters().count(), 0);
    }

    #[test]
    fn generated_nonces_differ() {
        let url = "https://api.example.com/x".into_endpoint_url().unwrap();
        let consumer = Consumer::new("key", "secret");
        let sign = || {
            OAuthRequest::builder()
                .method(Method::GET)
                .url(&url)
                .consumer(&consumer)
                .timestamp(1)
                .build()
                .sign(&HmacSha1)
                .unwrap()
        };

        let first = sign();
        let second = sign();
        assert_ne!(first.signature(), second.signature());

        let nonce = first
            .parameters()
            .find(|(name, _)| *name == "oauth_nonce")
            .map(|(_, value)| value.to_owned())
            .unwrap();
        assert_eq!(nonce.len(), NONCE_BYTES * 2);
    }
}
