//! Wire protocol for Queueline.
//!
//! This crate defines everything that travels between the apps and the
//! queue service's GraphQL endpoint:
//!
//! - **Records** ([`Turn`], [`StoreFeature`], [`User`], etc.): the server
//!   owned data the apps render.
//! - **Envelopes** ([`GraphQlRequest`], [`GraphQlResponse`],
//!   [`GraphQlError`]): the GraphQL-over-HTTP framing.
//! - **Operations** ([`Operation`] and the types in [`ops`]): every query
//!   and mutation the apps send, with typed variables and typed data.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how envelopes become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes over HTTP) and the
//! application facades. It doesn't know about tokens or polling, only about
//! the shape of messages.
//!
//! ```text
//! Transport (bytes) → Protocol (GraphQlResponse<Data>) → Apps (Customer / Seller)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod graphql;
pub mod ops;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use graphql::{GraphQlError, GraphQlRequest, GraphQlResponse, Operation, RawResponse};
pub use types::{
    AuthUser, Coordinates, Geometry, StoreFeature, StoreProperties, Turn,
    TurnId, TurnMember, User, UserId, Weekday,
};
