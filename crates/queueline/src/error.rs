//! Unified error type for the Queueline SDK.

use queueline_protocol::ProtocolError;
use queueline_session::SessionError;
use queueline_transport::TransportError;

use crate::{ConfigError, LocationError, ValidationError};

/// Top-level error that wraps all crate-specific errors.
///
/// Every facade method returns this. Use [`kind`](Self::kind) to decide
/// what the user sees, and [`user_message`](Self::user_message) for the
/// text.
#[derive(Debug, thiserror::Error)]
pub enum QueuelineError {
    /// The request never got a response (connect, timeout, I/O).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response couldn't be understood, or had no data.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Secure storage failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Input rejected before anything was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No device position.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Invalid client configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The server refused the session token. The session has already
    /// been cleared; route the user to login.
    #[error("session is no longer valid")]
    Unauthorized,

    /// A non-success HTTP status with no GraphQL body to explain it.
    #[error("server answered HTTP {status}")]
    Http { status: u16 },

    /// The server answered with GraphQL errors (e.g. a taken name).
    #[error("request rejected: {}", messages.join("; "))]
    Rejected { messages: Vec<String> },

    /// A registration or rename asked for a name someone else has.
    #[error("{0}")]
    NameNotAvailable(String),
}

/// What kind of failure an error is, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connectivity: show a retry-by-hand alert.
    Network,
    /// Session invalid: go to login.
    Unauthorized,
    /// Bad input or a refused name: show inline.
    Validation,
    /// Malformed or empty response, or a bug.
    Unexpected,
    /// Secure storage fault.
    Storage,
    /// Location permission or fix.
    Location,
}

impl QueuelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(e) => match e {
                TransportError::Connect(_) | TransportError::Timeout | TransportError::Request(_) => {
                    ErrorKind::Network
                }
                TransportError::InvalidHeader(_) | TransportError::ClientBuild(_) => {
                    ErrorKind::Unexpected
                }
            },
            Self::Http { .. } => ErrorKind::Network,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Validation(_) | Self::Rejected { .. } | Self::NameNotAvailable(_) => {
                ErrorKind::Validation
            }
            Self::Session(SessionError::Storage(_)) => ErrorKind::Storage,
            Self::Session(SessionError::EmptyToken) => ErrorKind::Unexpected,
            Self::Location(_) => ErrorKind::Location,
            Self::Protocol(_) | Self::Config(_) => ErrorKind::Unexpected,
        }
    }

    /// Text to show the user.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Network => "Please check your internet connection.".to_string(),
            ErrorKind::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ErrorKind::Validation | ErrorKind::Location => match self {
                Self::Rejected { messages } => messages.join("\n"),
                other => other.to_string(),
            },
            ErrorKind::Storage => "Couldn't access secure storage on this device.".to_string(),
            ErrorKind::Unexpected => "Something went wrong. Please try again.".to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
