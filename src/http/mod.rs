//! HTTP client and response abstractions.
//!
//! The flow controllers never talk to the network directly. Callers provide
//! an [`HttpClient`] (backed by `reqwest`, `hyper`, or a WASM-compatible
//! client) and the controllers issue `http::Request`s through it, reading back
//! only the status code, headers and body.

mod options;
#[cfg(all(not(target_arch = "wasm32"), feature = "http-client-reqwest-0_13"))]
mod reqwest_0_13;

use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};

use crate::platform::{MaybeSend, MaybeSendSync};

pub use options::TransportOptions;
#[cfg(all(not(target_arch = "wasm32"), feature = "http-client-reqwest-0_13"))]
pub use reqwest_0_13::reqwest_client;

/// Defines the common interface for HTTP requests.
pub trait HttpClient: MaybeSendSync {
    /// The error type returned by the client for a failed request.
    type Error: crate::Error;

    /// The associated response type returned by this HTTP client.
    type Response: HttpResponse;

    /// Executes an HTTP request and returns an owned response.
    ///
    /// Requests issued by the OAuth 1.0a controller carry a
    /// [`TransportOptions`] value in their extensions, which clients should
    /// honour where they can.
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + MaybeSend;
}

/// Defines the common interface for HTTP responses.
pub trait HttpResponse: MaybeSendSync {
    /// The error type when getting the response body.
    type Error: crate::Error;

    /// Returns the HTTP status code of the response.
    fn status(&self) -> StatusCode;

    /// Returns the response's HTTP headers.
    fn headers(&self) -> HeaderMap;

    /// Consumes the response and returns its body.
    fn body(self) -> impl Future<Output = Result<Bytes, Self::Error>> + MaybeSend;
}
