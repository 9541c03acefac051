//! OAuth 1.0a request signing (RFC 5849 §3.4).
//!
//! A request is signed by collecting its parameters (protocol parameters,
//! the endpoint's query and caller-supplied parameters), normalizing them
//! into the signature base string and signing that string with a
//! [`SignatureMethod`]. [`HmacSha1`] is the method used by the flow
//! controllers.

mod base_string;
mod encode;
mod method;
mod request;

pub use base_string::{base_string, normalize_parameters};
pub use encode::{percent_decode, percent_encode};
pub use method::{HmacSha1, Plaintext, SignatureMethod, SigningError, signing_key};
pub use request::{OAuthRequest, SignedRequest};

/// The `oauth_version` sent with every signed request.
pub const OAUTH_VERSION: &str = "1.0";
