//! The shared polling switch.
//!
//! ```text
//!   POLLING ──suspend() (credential-rotating mutation)──→ SUSPENDED
//!      ▲                                                      │
//!      └──────────── resume() / fresh controller ─────────────┘
//! ```
//!
//! There is no automatic way back to `POLLING`. Either the caller
//! explicitly calls [`PollingController::resume`] (a rejected rename), or
//! the app starts over with a new controller after the user logs in again.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// The polling options every live screen reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingOptions {
    pub should_poll: bool,
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self { should_poll: true }
    }
}

/// A cloneable handle on the polling options.
///
/// Cloning is cheap and every clone sees the same state. It's passed
/// explicitly to whoever needs it (facades, pollers, tests) instead of
/// living in a global.
#[derive(Debug, Clone)]
pub struct PollingController {
    tx: Arc<watch::Sender<PollingOptions>>,
}

impl Default for PollingController {
    fn default() -> Self {
        Self::new()
    }
}

impl PollingController {
    /// A controller in the `POLLING` state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PollingOptions::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn options(&self) -> PollingOptions {
        *self.tx.borrow()
    }

    pub fn should_poll(&self) -> bool {
        self.tx.borrow().should_poll
    }

    /// Replaces the options and returns the previous ones. Subscribers
    /// are only woken if something actually changed.
    pub fn set_polling_options(&self, options: PollingOptions) -> PollingOptions {
        let mut previous = options;
        self.tx.send_if_modified(|current| {
            previous = *current;
            if *current == options {
                false
            } else {
                *current = options;
                true
            }
        });
        if previous != options {
            debug!(should_poll = options.should_poll, "polling options changed");
        }
        previous
    }

    /// Turns polling off. Returns the options in force before the call,
    /// so a caller can put them back if its mutation is rejected.
    ///
    /// The change is visible to every clone as soon as this returns.
    pub fn suspend(&self) -> PollingOptions {
        self.set_polling_options(PollingOptions { should_poll: false })
    }

    /// Turns polling back on.
    pub fn resume(&self) -> PollingOptions {
        self.set_polling_options(PollingOptions { should_poll: true })
    }

    /// A receiver that observes every change to the options.
    pub fn subscribe(&self) -> watch::Receiver<PollingOptions> {
        self.tx.subscribe()
    }
}
