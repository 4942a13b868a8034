/// Errors that can occur in the transport layer.
///
/// All of these mean "no usable HTTP response arrived". They surface to the
/// user as a connectivity problem.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint couldn't be reached (DNS, refused, TLS handshake).
    #[error("connect failed: {0}")]
    Connect(String),

    /// The request or connect timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The request failed after connecting (reset, truncated body).
    #[error("request failed: {0}")]
    Request(String),

    /// A header value contained characters HTTP doesn't allow.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// The HTTP client couldn't be built (bad TLS config, etc.).
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}
