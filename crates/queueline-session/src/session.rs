//! The session record and the storage keys it lives under.
//!
//! A "session" is the client's record of an authenticated identity:
//! - WHAT proves it to the server (the bearer `token`)
//! - WHETHER the app should open on the home screen (`is_logged_in`)
//!
//! Lifecycle:
//!
//! ```text
//!   (install) ──login / register──→ { Some(token), true }
//!                                        │
//!               logout / unauthorized ───┘──→ { None, false }
//! ```

/// Secure-storage key holding the bearer token.
pub const LOGIN_TOKEN_KEY: &str = "LOGIN_TOKEN";

/// Secure-storage key holding the logged-in flag, `"1"` or `"0"`.
pub const IS_LOGGED_KEY: &str = "IS_LOGGED";

/// Cache-storage key holding the account id of the logged-in customer.
/// Not sensitive, so it lives in the less-secure store.
pub const USER_ID_KEY: &str = "USER_ID";

/// Wire values of the logged-in flag.
pub(crate) const LOGGED_IN: &str = "1";
pub(crate) const LOGGED_OUT: &str = "0";

/// A snapshot of the persisted session.
///
/// Produced by [`SessionStore::session`](crate::SessionStore::session);
/// holding one doesn't keep anything alive; it's a copy for one decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub is_logged_in: bool,
}

impl Session {
    /// A session that can authorize requests: flagged logged-in with a
    /// token present.
    pub fn is_authenticated(&self) -> bool {
        self.is_logged_in && self.token.is_some()
    }
}
