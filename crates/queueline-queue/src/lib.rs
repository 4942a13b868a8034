//! Queue domain logic for Queueline.
//!
//! Everything here is a pure function over records the server already
//! returned: no I/O, no clocks, no state. The server is the authority on
//! queue order; this crate only reads it.
//!
//! # Key items
//!
//! - [`queue_position`] / [`people_ahead_label`]: where a turn stands
//! - [`TurnOutcome`]: how a closed turn ended
//! - [`describe_opening_days`] / [`opening_hours`]: store schedule text
//! - [`StoreQueue`]: a store's queue as seen by one customer

mod outcome;
mod position;
mod schedule;
mod view;

pub use outcome::TurnOutcome;
pub use position::{people_ahead_label, position_in_store, queue_position};
pub use schedule::{clock_time, describe_opening_days, opening_hours};
pub use view::StoreQueue;
