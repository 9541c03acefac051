//! Token-endpoint response parsers.
//!
//! Pure functions from a response body to a token value. A token is only
//! produced when every required field is present and non-empty.

use std::{collections::HashMap, string::FromUtf8Error};

use serde::Deserialize;
use snafu::prelude::*;

use crate::token::{AccessToken, OAuth1AccessToken, Token};

#[derive(Debug, Deserialize)]
struct OAuth2JsonBody {
    access_token: Option<String>,
    user_id: Option<serde_json::Value>,
}

fn decode_component(raw: &[u8]) -> Result<String, FromUtf8Error> {
    let raw = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect::<Vec<_>>();
    String::from_utf8(urlencoding::decode_binary(&raw).into_owned())
}

/// Decodes an `application/x-www-form-urlencoded` body.
///
/// A repeated field keeps its last value. Fields that are not UTF-8, raw or
/// once unescaped, reject the whole body.
fn form_fields(body: &[u8]) -> Result<HashMap<String, String>, FromUtf8Error> {
    body.split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, |&b| b == b'=');
            let name = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default();
            Ok((decode_component(name)?, decode_component(value)?))
        })
        .collect()
}

fn take_non_empty(fields: &mut HashMap<String, String>, name: &str) -> Option<String> {
    fields.remove(name).filter(|v| !v.is_empty())
}

fn parse_oauth1(body: &[u8], expected: &'static str) -> Result<(Token, Option<String>), MalformedTokenResponse> {
    let mut fields = form_fields(body).context(DecodeSnafu)?;

    let key = take_non_empty(&mut fields, "oauth_token").context(MissingFieldSnafu {
        expected,
        field: "oauth_token",
    })?;
    let secret = take_non_empty(&mut fields, "oauth_token_secret").context(MissingFieldSnafu {
        expected,
        field: "oauth_token_secret",
    })?;

    Ok((Token::new(key, secret), take_non_empty(&mut fields, "user_id")))
}

/// Parses an OAuth 1 request-token response
/// (`oauth_token=...&oauth_token_secret=...`).
///
/// # Errors
///
/// Returns [`MalformedTokenResponse`] if either field is missing.
pub fn parse_request_token(body: &[u8]) -> Result<Token, MalformedTokenResponse> {
    parse_oauth1(body, "request token").map(|(token, _)| token)
}

/// Parses an OAuth 1 access-token response, capturing `user_id` when present.
///
/// # Errors
///
/// Returns [`MalformedTokenResponse`] if `oauth_token` or
/// `oauth_token_secret` is missing.
pub fn parse_access_token_oauth1(body: &[u8]) -> Result<OAuth1AccessToken, MalformedTokenResponse> {
    let (token, user_id) = parse_oauth1(body, "access token")?;
    Ok(OAuth1AccessToken::new(token, user_id))
}

/// Parses a form-encoded OAuth 2 token response (`access_token=...`).
///
/// # Errors
///
/// Returns [`InvalidAccessToken`] if `access_token` is missing.
pub fn parse_access_token_oauth2(body: &[u8]) -> Result<AccessToken, InvalidAccessToken> {
    let mut fields = form_fields(body).context(DecodeFormSnafu)?;
    let token = take_non_empty(&mut fields, "access_token").context(MissingAccessTokenSnafu)?;
    Ok(AccessToken::new(token, take_non_empty(&mut fields, "user_id")))
}

/// Parses a JSON OAuth 2 token response (`{"access_token": "..."}`).
///
/// A numeric `user_id` is converted to its decimal string.
///
/// # Errors
///
/// Returns [`InvalidAccessToken`] if the body is not a JSON object or has no
/// `access_token`.
pub fn parse_access_token_oauth2_json(body: &[u8]) -> Result<AccessToken, InvalidAccessToken> {
    let parsed: OAuth2JsonBody = serde_json::from_slice(body).context(DecodeJsonSnafu)?;
    let token = parsed
        .access_token
        .filter(|v| !v.is_empty())
        .context(MissingAccessTokenSnafu)?;

    let user_id = match parsed.user_id {
        Some(serde_json::Value::String(id)) if !id.is_empty() => Some(id),
        Some(serde_json::Value::Number(id)) => Some(id.to_string()),
        _ => None,
    };

    Ok(AccessToken::new(token, user_id))
}

/// An OAuth 1 token endpoint answered 200 with an unusable body.
#[derive(Debug, Snafu)]
pub enum MalformedTokenResponse {
    /// A form field is not valid UTF-8.
    #[snafu(display("Token response is not valid UTF-8"))]
    Decode {
        /// The underlying error.
        source: FromUtf8Error,
    },
    /// A required field is absent or empty.
    #[snafu(display("Response is not a valid {expected}: '{field}' is missing"))]
    MissingField {
        /// The kind of token expected.
        expected: &'static str,
        /// The missing field.
        field: &'static str,
    },
}

impl crate::Error for MalformedTokenResponse {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// An OAuth 2 token endpoint returned no usable access token.
#[derive(Debug, Snafu)]
pub enum InvalidAccessToken {
    /// A form field is not valid UTF-8.
    #[snafu(display("Token response is not valid UTF-8"))]
    DecodeForm {
        /// The underlying error.
        source: FromUtf8Error,
    },
    /// The body is not a JSON object.
    #[snafu(display("Token response is not a JSON object"))]
    DecodeJson {
        /// The underlying error.
        source: serde_json::Error,
    },
    /// `access_token` is absent or empty.
    #[snafu(display("Provider API returned an unexpected response: no access_token"))]
    MissingAccessToken,
}

impl crate::Error for InvalidAccessToken {
    fn is_retryable(&self) -> bool {
        false
    }
}
