//! Device location.
//!
//! The customer app asks for the device position once, when the store
//! list opens, and uses it for the nearby-stores query. Permission is the
//! platform's business; [`LocationProvider`] only reports the outcome.

use std::future::Future;

use queueline_protocol::Coordinates;

/// Why no position is available.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Please allow this app to use location in your phone.")]
    PermissionDenied,

    #[error("Couldn't verify your location: {0}")]
    Unavailable(String),
}

/// A one-shot source of the device position.
pub trait LocationProvider: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// A provider with a predetermined answer. Used by the CLI (position from
/// flags) and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLocation {
    answer: Result<Coordinates, LocationError>,
}

impl FixedLocation {
    pub fn new(position: Coordinates) -> Self {
        Self {
            answer: Ok(position),
        }
    }

    pub fn denied() -> Self {
        Self {
            answer: Err(LocationError::PermissionDenied),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            answer: Err(LocationError::Unavailable(reason.into())),
        }
    }
}

impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.answer.clone()
    }
}
