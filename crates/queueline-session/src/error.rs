//! Error types for the session layer.

/// Errors raised by a [`KeyValueStore`](crate::KeyValueStore).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data exists but can't be parsed.
    #[error("storage is corrupt: {0}")]
    Corrupt(String),

    /// The store refused the operation (locked keychain, denied access).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while reading or changing the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The underlying secure storage failed.
    #[error("secure storage failed: {0}")]
    Storage(#[from] StorageError),

    /// Refused to persist an empty token as a logged-in session.
    #[error("refusing to store an empty session token")]
    EmptyToken,
}
