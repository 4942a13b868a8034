//! # Queueline
//!
//! Client SDK for the Queueline queue management service.
//!
//! Two application facades sit on one authenticated GraphQL client:
//!
//! - [`Customer`]: find stores, join and leave queues, watch your place
//! - [`Seller`]: run a store's queue and browse its history
//!
//! Both share a [`SessionStore`] (who is logged in) and a
//! [`PollingController`] (whether live screens may refresh).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use queueline::prelude::*;
//!
//! # async fn run() -> Result<(), QueuelineError> {
//! let config = ClientConfig::from_env()?;
//! let session = SessionStore::new(MemoryStore::new(), MemoryStore::new());
//! let client = GraphQlClient::connect(&config, session)?;
//! let customer = Customer::new(client, PollingController::new(), config.poll_config());
//!
//! customer.login("maria", "hunter22").await?;
//! for entry in customer.my_turns().await? {
//!     println!("{}: {}", entry.store_name(), entry.people_ahead_label());
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod customer;
mod error;
mod location;
pub mod logging;
mod seller;

pub use auth::{
    LaunchRoute, ReloginRequired, ValidationError, validate_customer_login, validate_new_name,
    validate_registration, validate_seller_login,
};
pub use client::GraphQlClient;
pub use config::{ClientConfig, ConfigError};
pub use customer::{Customer, MyTurn};
pub use error::{ErrorKind, QueuelineError};
pub use location::{FixedLocation, LocationError, LocationProvider};
pub use seller::{ClosedTurn, Seller, StoreRegistration};

pub use queueline_poll::{PollConfig, PollHandle, PollingController, PollingOptions};
pub use queueline_protocol::{
    AuthUser, Coordinates, StoreFeature, StoreProperties, Turn, TurnId, User, UserId, Weekday,
};
pub use queueline_queue::{
    StoreQueue, TurnOutcome, clock_time, describe_opening_days, opening_hours, people_ahead_label,
};
pub use queueline_session::{FileStore, KeyValueStore, MemoryStore, Session, SessionStore};
pub use queueline_transport::{HttpConfig, HttpTransport, Transport};

/// Everything an application needs, in one import.
pub mod prelude {
    pub use crate::{
        ClientConfig, ClosedTurn, Coordinates, Customer, ErrorKind, FileStore, FixedLocation,
        GraphQlClient, HttpTransport, LaunchRoute, LocationProvider, MemoryStore, MyTurn,
        PollConfig, PollHandle, PollingController, QueuelineError, ReloginRequired, Seller,
        SessionStore, StoreFeature, StoreRegistration, Turn, TurnId, TurnOutcome, UserId,
        Weekday,
    };
}
