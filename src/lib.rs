//! Implements OAuth 1.0a and OAuth 2.0 authorization flows for obtaining a
//! user's identity from a third-party provider.

#![forbid(unsafe_code)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod credentials;
mod endpoint_url;
mod error;
pub mod flow;
pub mod http;
pub mod platform;
pub mod prelude;
pub mod signature;
pub mod token;

pub use endpoint_url::{EndpointUrl, EndpointUrlError, IntoEndpointUrl};
pub use error::{BoxedError, Error};

/// Documentation
pub mod _documentation {
    #[doc = include_str!("../README.md")]
    mod readme {}
}

/// Re-export of parts of the `secrecy` crate.
pub mod secrecy {
    pub use ::secrecy::{ExposeSecret, SecretString};
}

pub use bytes::Bytes;
