//! Error types for the protocol layer.
//!
//! Each crate in Queueline defines its own error enum. When you see a
//! `ProtocolError`, the bytes arrived fine but didn't have the shape we
//! expected, or we couldn't produce the bytes in the first place.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of an outgoing request failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization of a response failed.
    ///
    /// Common causes: the server returned HTML (a proxy error page),
    /// a field changed type, or the body was truncated.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The response decoded, but violates GraphQL framing rules, for
    /// example it carries neither `data` nor `errors`.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A value didn't parse into a protocol type (e.g. an unknown
    /// weekday code).
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
