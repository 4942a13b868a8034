//! Polling for Queueline.
//!
//! The apps approximate live updates by re-fetching server state on a
//! timer. This crate provides the three pieces of that:
//!
//! - [`PollingController`]: the shared `should_poll` switch. A screen about
//!   to rotate credentials flips it off before sending the mutation.
//! - [`PollScheduler`]: a periodic timer with clamped intervals, start
//!   jitter, skip-ahead on overruns, pause/resume, and counters.
//! - [`spawn_poller`]: a cancellable task owned by one screen that drives a
//!   fetch closure with the scheduler and obeys the controller.
//!
//! # Integration
//!
//! ```ignore
//! let controller = PollingController::new();
//! let (handle, mut results) = spawn_poller(
//!     controller.clone(),
//!     PollConfig::default(),
//!     move || { let customer = customer.clone(); async move { customer.my_turns().await } },
//! );
//! while let Some(result) = results.recv().await {
//!     render(result);
//! }
//! handle.stop().await; // screen unmounted
//! ```

mod controller;
mod poller;
mod scheduler;

pub use controller::{PollingController, PollingOptions};
pub use poller::{PollHandle, spawn_poller};
pub use scheduler::{PollConfig, PollInfo, PollMetrics, PollScheduler};
