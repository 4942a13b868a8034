//! GraphQL-over-HTTP framing.
//!
//! Every call the apps make is a `POST` of one JSON object:
//!
//! ```text
//! { "query": "...", "operationName": "cancelTurn", "variables": { "turnId": "7" } }
//! ```
//!
//! and every answer is `{ "data": ..., "errors": [...] }` where either half
//! may be missing. [`Operation`] ties a document to the Rust types of its
//! variables and its `data`, so callers never touch untyped JSON.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// A named GraphQL query or mutation with typed variables and result.
///
/// Implementors are zero-sized marker types (see [`crate::ops`]). The
/// client is generic over `O: Operation`, so asking for `CancelTurn` with
/// the wrong variables is a compile error rather than a server error.
pub trait Operation {
    /// The `operationName` sent with the request.
    const NAME: &'static str;

    /// The GraphQL document.
    const DOCUMENT: &'static str;

    /// `true` for mutations. Used only for logging.
    const IS_MUTATION: bool;

    /// Variables object. Use `()`-like empty structs for none.
    type Variables: Serialize + Send + Sync;

    /// The shape of the `data` member of a successful response.
    type Data: DeserializeOwned + Send;
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// The body of one GraphQL HTTP request.
///
/// Borrows everything: it's built, encoded, and dropped within a single
/// call.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(rename = "operationName")]
    pub operation_name: &'a str,
    pub variables: &'a V,
}

impl<'a, V: Serialize> GraphQlRequest<'a, V> {
    /// Builds the request for operation `O`.
    pub fn for_operation<O>(variables: &'a V) -> Self
    where
        O: Operation<Variables = V>,
    {
        Self {
            query: O::DOCUMENT,
            operation_name: O::NAME,
            variables,
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// The body of one GraphQL HTTP response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "D: DeserializeOwned"))]
pub struct GraphQlResponse<D> {
    #[serde(default)]
    pub data: Option<D>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

impl<D> GraphQlResponse<D> {
    /// `true` when any error is an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        self.errors.iter().any(GraphQlError::is_unauthorized)
    }

    /// The messages of all errors, in order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

/// A response whose `data` is still untyped JSON.
///
/// Servers often answer an error with partial data such as
/// `{"tokenAuth": null}`, which the operation's typed `Data` can't hold.
/// Decoding into `RawResponse` first lets the caller look at `errors`
/// before committing to a shape.
pub type RawResponse = GraphQlResponse<serde_json::Value>;

impl GraphQlResponse<serde_json::Value> {
    /// Decodes `data` into `D`. Missing or `null` data is `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if `data` doesn't fit `D`.
    pub fn typed_data<D: DeserializeOwned>(self) -> Result<Option<D>, ProtocolError> {
        match self.data {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(ProtocolError::Decode),
        }
    }
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

/// Messages the JWT backend uses when a token is missing, expired,
/// malformed, or lacks permission. Compared case-insensitively after
/// trimming.
const UNAUTHORIZED_MESSAGES: &[&str] = &[
    "you do not have permission to perform this action",
    "signature has expired",
    "error decoding signature",
    "invalid token",
    "authentication credentials were not provided",
];

impl GraphQlError {
    /// Creates an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: None,
        }
    }

    /// Returns `true` if this error means the session is no longer valid.
    ///
    /// Recognizes the JWT backend's messages and the common
    /// `extensions.code == "UNAUTHENTICATED"` convention.
    pub fn is_unauthorized(&self) -> bool {
        let code_says_so = self
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(serde_json::Value::as_str)
            .is_some_and(|code| code == "UNAUTHENTICATED");
        if code_says_so {
            return true;
        }

        let message = self.message.trim().trim_end_matches('.').to_ascii_lowercase();
        UNAUTHORIZED_MESSAGES.iter().any(|m| message == *m)
    }
}
