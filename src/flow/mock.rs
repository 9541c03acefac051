//! A recording [`HttpClient`] for controller tests.

use std::{collections::VecDeque, convert::Infallible, sync::Mutex};

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, Version, header::CONTENT_TYPE};

use crate::http::{HttpClient, HttpResponse, TransportOptions};

#[derive(Debug, snafu::Snafu)]
#[snafu(display("mock transport error"))]
pub struct MockError {
    pub retryable: bool,
}

impl crate::Error for MockError {
    fn is_retryable(&self) -> bool {
        self.retryable
    }
}

#[derive(Debug)]
pub struct MockResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse for MockResponse {
    type Error = Infallible;

    fn status(&self) -> StatusCode {
        self.status
    }

    fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    async fn body(self) -> Result<Bytes, Infallible> {
        Ok(self.body)
    }
}

/// What the controller sent.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub options: Option<TransportOptions>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }
}

#[derive(Debug, Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<MockResponse, MockError>>>,
    captured: Mutex<Vec<Captured>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.respond_with(status, None, body)
    }

    pub fn respond_with(self, status: u16, content_type: Option<&str>, body: &str) -> Self {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        }
        self.responses.lock().unwrap().push_back(Ok(MockResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: Bytes::copy_from_slice(body.as_bytes()),
        }));
        self
    }

    pub fn fail(self, retryable: bool) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(MockError { retryable }));
        self
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Captured {
        self.requests().pop().expect("no request was sent")
    }
}

impl HttpClient for MockClient {
    type Error = MockError;
    type Response = MockResponse;

    async fn execute(&self, request: Request<Bytes>) -> Result<MockResponse, MockError> {
        let (parts, body) = request.into_parts();
        self.captured.lock().unwrap().push(Captured {
            options: parts.extensions.get::<TransportOptions>().copied(),
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no canned response left")
    }
}
