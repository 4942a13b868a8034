//! Transport abstraction layer for Queueline.
//!
//! Provides the [`Transport`] trait: send one request body (plus an
//! optional `authorization` header value) to the API endpoint and hand back
//! the status and body. It knows nothing about GraphQL or sessions; the
//! authenticated client in the `queueline` crate builds on top of it.
//!
//! # Feature Flags
//!
//! - `http` (default): [`HttpTransport`] via `reqwest`

mod error;
#[cfg(feature = "http")]
mod http;

pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpTransport};

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating request ids.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for one outgoing request, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Allocates the next id.
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// One outgoing request to the API endpoint.
#[derive(Clone)]
pub struct HttpRequest {
    pub id: RequestId,
    /// Encoded request body (JSON).
    pub body: Vec<u8>,
    /// Full `authorization` header value, e.g. `JWT abc`. `None` sends the
    /// request unauthenticated.
    pub authorization: Option<String>,
}

impl HttpRequest {
    /// Creates an unauthenticated request with a fresh id.
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            id: RequestId::next(),
            body,
            authorization: None,
        }
    }

    /// Sets the `authorization` header value.
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

/// Hand-written so credentials never end up in logs.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("id", &self.id)
            .field("body_len", &self.body.len())
            .field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `true` for 401 Unauthorized and 403 Forbidden.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

/// Sends requests to the API endpoint.
///
/// - `Send + Sync + 'static` → one transport is shared by the foreground
///   app and every background polling task.
/// - The returned future is `Send` so it can be awaited inside
///   `tokio::spawn`ed pollers.
///
/// Implementations must not retry; recovery is always user-initiated.
pub trait Transport: Send + Sync + 'static {
    /// Sends `request` and waits for the complete response.
    ///
    /// Any HTTP status counts as `Ok`; only failing to get a response at
    /// all is an error.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).send(request)
    }
}
