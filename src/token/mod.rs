//! OAuth 1.0a and OAuth 2.0 token values.
//!
//! Token values are only ever produced by parsing a successful provider
//! response (see [`crate::flow::response`]) or from callback parameters.

mod access_token;
mod oauth1;

pub use access_token::AccessToken;
pub use oauth1::{OAuth1AccessToken, Token};

pub(crate) fn serialize_secret<S: serde::Serializer>(
    secret: &secrecy::SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use secrecy::ExposeSecret as _;
    serializer.serialize_str(secret.expose_secret())
}
