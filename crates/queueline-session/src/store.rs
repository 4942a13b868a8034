//! The session store: the only reader and writer of the persisted session.
//!
//! Everything that needs to know "who is logged in" goes through
//! [`SessionStore`]. The authenticated client reads the token before every
//! request; login and logout flows write it; the unauthorized interceptor
//! clears it.
//!
//! # Consistency
//!
//! Token and flag are two keys, but they describe one fact. Writers take
//! an internal async mutex so two concurrent `set_session` /
//! `clear_session` calls can't interleave into a mixed pair, and a failed
//! flag write rolls the token back to what it was before.

use queueline_protocol::UserId;
use tokio::sync::Mutex;

use crate::session::{LOGGED_IN, LOGGED_OUT};
use crate::{
    IS_LOGGED_KEY, KeyValueStore, LOGIN_TOKEN_KEY, Session, SessionError, StorageError,
    USER_ID_KEY,
};

/// Persists the session token, the logged-in flag, and the cached user id.
///
/// `secure` holds the token and flag; `cache` holds the non-sensitive
/// user id. They may be two handles on the same backend.
///
/// ## Lifecycle
///
/// ```text
/// set_session(token, true) ──→ [logged in] ──→ clear_session() ──→ [logged out]
///        ▲                                                              │
///        └──────────────────────── login again ─────────────────────────┘
/// ```
#[derive(Debug)]
pub struct SessionStore<K> {
    secure: K,
    cache: K,
    write_lock: Mutex<()>,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub fn new(secure: K, cache: K) -> Self {
        Self {
            secure,
            cache,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the stored token, or `None` if there isn't one.
    ///
    /// Storage faults are logged and reported as `None`; a client that
    /// can't read its token is, for every practical purpose, logged out.
    /// Use [`try_get_token`](Self::try_get_token) to tell the two apart.
    pub async fn get_token(&self) -> Option<String> {
        match self.try_get_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read session token");
                None
            }
        }
    }

    /// Returns the stored token, surfacing storage faults.
    ///
    /// An empty stored value counts as no token.
    pub async fn try_get_token(&self) -> Result<Option<String>, SessionError> {
        let token = self.secure.get(LOGIN_TOKEN_KEY).await?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    /// Persists `token` and the logged-in flag.
    ///
    /// # Errors
    /// - [`SessionError::EmptyToken`] if `token` is empty; nothing is written.
    /// - [`SessionError::Storage`] if either write fails. If the flag write
    ///   fails, the token is restored to its previous value first.
    pub async fn set_session(&self, token: &str, is_logged_in: bool) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let _guard = self.write_lock.lock().await;
        let previous = self.secure.get(LOGIN_TOKEN_KEY).await?;

        self.secure.set(LOGIN_TOKEN_KEY, token).await?;

        let flag = if is_logged_in { LOGGED_IN } else { LOGGED_OUT };
        if let Err(e) = self.secure.set(IS_LOGGED_KEY, flag).await {
            self.restore_token(previous.as_deref()).await;
            return Err(e.into());
        }

        tracing::info!(is_logged_in, "session stored");
        Ok(())
    }

    /// Forgets the session: deletes the token, sets the flag to `"0"`, and
    /// drops the cached user id.
    ///
    /// Every step is attempted even if an earlier one fails; the first
    /// failure is returned.
    pub async fn clear_session(&self) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().await;

        let results = [
            self.secure.delete(LOGIN_TOKEN_KEY).await,
            self.secure.set(IS_LOGGED_KEY, LOGGED_OUT).await,
            self.cache.delete(USER_ID_KEY).await,
        ];

        let first_error = results.into_iter().find_map(Result::err);
        match first_error {
            Some(e) => {
                tracing::warn!(error = %e, "session only partially cleared");
                Err(e.into())
            }
            None => {
                tracing::info!("session cleared");
                Ok(())
            }
        }
    }

    /// Whether the logged-in flag is set. Storage faults read as `false`.
    pub async fn is_logged_in(&self) -> bool {
        match self.secure.get(IS_LOGGED_KEY).await {
            Ok(flag) => flag.as_deref() == Some(LOGGED_IN),
            Err(e) => {
                tracing::warn!(error = %e, "could not read logged-in flag");
                false
            }
        }
    }

    /// A snapshot of both persisted fields.
    pub async fn session(&self) -> Result<Session, SessionError> {
        let token = self.try_get_token().await?;
        let flag = self.secure.get(IS_LOGGED_KEY).await?;
        Ok(Session {
            token,
            is_logged_in: flag.as_deref() == Some(LOGGED_IN),
        })
    }

    /// Caches the logged-in account's id.
    pub async fn set_user_id(&self, id: &UserId) -> Result<(), SessionError> {
        self.cache.set(USER_ID_KEY, id.as_str()).await?;
        Ok(())
    }

    /// The cached account id, if any. Storage faults read as `None`.
    pub async fn user_id(&self) -> Option<UserId> {
        match self.cache.get(USER_ID_KEY).await {
            Ok(id) => id.filter(|id| !id.is_empty()).map(UserId::from),
            Err(e) => {
                tracing::warn!(error = %e, "could not read cached user id");
                None
            }
        }
    }

    async fn restore_token(&self, previous: Option<&str>) {
        let result: Result<(), StorageError> = match previous {
            Some(token) => self.secure.set(LOGIN_TOKEN_KEY, token).await,
            None => self.secure.delete(LOGIN_TOKEN_KEY).await,
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "could not roll back session token");
        }
    }
}
