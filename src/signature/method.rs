use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use snafu::prelude::*;

use crate::{platform::MaybeSendSync, signature::percent_encode};

/// Builds the key used to sign a request (RFC 5849 §3.4.2).
///
/// The key is the encoded consumer secret and the encoded token secret joined
/// by `&`. The token secret is empty when requesting a request token.
#[must_use]
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

/// An OAuth 1.0a signature method.
pub trait SignatureMethod: MaybeSendSync {
    /// The value sent as `oauth_signature_method`.
    fn name(&self) -> &'static str;

    /// Signs the base string, returning the value sent as `oauth_signature`.
    ///
    /// # Errors
    ///
    /// Returns an error if the signing primitive rejects the key. This does
    /// not happen for well-formed inputs.
    fn sign(
        &self,
        base_string: &str,
        consumer_secret: &str,
        token_secret: &str,
    ) -> Result<String, SigningError>;
}

/// `HMAC-SHA1` (RFC 5849 §3.4.2): `Base64(HMAC-SHA1(key, base string))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1;

impl SignatureMethod for HmacSha1 {
    fn name(&self) -> &'static str {
        "HMAC-SHA1"
    }

    fn sign(
        &self,
        base_string: &str,
        consumer_secret: &str,
        token_secret: &str,
    ) -> Result<String, SigningError> {
        let key = signing_key(consumer_secret, token_secret);
        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .ok()
            .context(InvalidKeySnafu { method: self.name() })?;
        mac.update(base_string.as_bytes());
        Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// `PLAINTEXT` (RFC 5849 §3.4.4): the signature is the signing key itself.
///
/// Only safe over TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl SignatureMethod for Plaintext {
    fn name(&self) -> &'static str {
        "PLAINTEXT"
    }

    fn sign(
        &self,
        _base_string: &str,
        consumer_secret: &str,
        token_secret: &str,
    ) -> Result<String, SigningError> {
        Ok(signing_key(consumer_secret, token_secret))
    }
}

/// A request could not be signed.
///
/// This indicates a programming error rather than a protocol failure.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum SigningError {
    /// The signing primitive rejected the key.
    #[snafu(display("{method} rejected the signing key"))]
    InvalidKey {
        /// The signature method in use.
        method: &'static str,
    },
}

impl crate::Error for SigningError {
    fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// OAuth Core 1.0 Appendix A.5.1/A.5.2 (photos.example.net).
    #[test]
    fn hmac_sha1_matches_oauth_core_appendix_vector() {
        let base = "GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg\
                    %26oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh\
                    %26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096\
                    %26oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal";

        let signature = HmacSha1
            .sign(base, "kd94hf93k423kf44", "pfkkdhi9sl3r4s00")
            .unwrap();
        assert_eq!(signature, "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");
    }

    /// Twitter's "Implementing Sign in with Twitter" request-token example.
    #[test]
    fn hmac_sha1_with_empty_token_secret() {
        let base = "POST&https%3A%2F%2Fapi.twitter.com%2Foauth%2Frequest_token&oauth_callback\
                    %3Dhttp%253A%252F%252Flocalhost%252Fsign-in-with-twitter%252F\
                    %26oauth_consumer_key%3DcChZNFj6T5R0TigYB9yd1w\
                    %26oauth_nonce%3Dea9ec8429b68d6b77cd5600adbbb0456\
                    %26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318467427\
                    %26oauth_version%3D1.0";
        let consumer_secret = "L8qq9PZyRg6ieKGEKhZolGC0vJWLw8iEJ88DRdyOg";

        assert_eq!(
            signing_key(consumer_secret, ""),
            "L8qq9PZyRg6ieKGEKhZolGC0vJWLw8iEJ88DRdyOg&"
        );
        assert_eq!(
            HmacSha1.sign(base, consumer_secret, "").unwrap(),
            "F1Li3tvehgcraF8DMJ7OyxO4w9Y="
        );
    }

    #[test]
    fn signing_key_encodes_both_secrets() {
        assert_eq!(signing_key("a&b", "c d"), "a%26b&c%20d");
    }

    #[test]
    fn plaintext_signature_is_the_signing_key() {
        assert_eq!(
            Plaintext.sign("ignored", "kd94hf93k423kf44", "").unwrap(),
            "kd94hf93k423kf44&"
        );
        assert_eq!(Plaintext.name(), "PLAINTEXT");
    }
}
