//! Session persistence for Queueline.
//!
//! This crate owns the one piece of state that outlives an app launch:
//! who is logged in.
//!
//! 1. **Storage**: where bytes live ([`KeyValueStore`] trait, with
//!    [`MemoryStore`] and [`FileStore`])
//! 2. **Session**: what is stored ([`Session`]: token + logged-in flag)
//! 3. **Session store**: the only component that reads or writes it
//!    ([`SessionStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Authenticated client (above)  ← reads the token before every request,
//!     ↕                            clears it on an unauthorized response
//! Session Layer (this crate)    ← persists token / logged-in flag / user id
//!     ↕
//! Secure storage (below)        ← key-value get / set / delete
//! ```

mod error;
mod session;
mod storage;
mod store;

pub use error::{SessionError, StorageError};
pub use session::{IS_LOGGED_KEY, LOGIN_TOKEN_KEY, Session, USER_ID_KEY};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::SessionStore;
