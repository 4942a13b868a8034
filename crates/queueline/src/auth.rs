//! Authentication flows shared by both facades.
//!
//! - Credential rules, checked before anything is sent
//! - Login: `tokenAuth`, then persist the session and cache the user id
//! - Registration: create the account, then log in with it
//! - Launch routing and logout
//! - Credential rotation (rename), which suspends polling first

use queueline_poll::PollingController;
use queueline_protocol::Operation;
use queueline_protocol::ops::{CredentialsVariables, NewNameVariables, TokenAuth};
use queueline_session::{KeyValueStore, SessionStore};
use queueline_transport::Transport;
use tracing::{debug, info, warn};

use crate::{GraphQlClient, QueuelineError};

// ---------------------------------------------------------------------------
// Credential rules
// ---------------------------------------------------------------------------

/// Minimum password length for a customer login.
pub const LOGIN_MIN_PASSWORD: usize = 5;
/// Minimum username length for any registration.
pub const REGISTER_MIN_USERNAME: usize = 5;
/// Minimum password length for any registration.
pub const REGISTER_MIN_PASSWORD: usize = 8;
/// Minimum store name length for a seller login.
pub const SELLER_LOGIN_MIN_USERNAME: usize = 2;
/// Maximum length of a new account or store name.
pub const NEW_NAME_MAX: usize = 20;

/// Input that fails a client-side rule. Nothing was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Username must be at least {min} characters")]
    UsernameTooShort { min: usize },

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("The new name can't be empty")]
    EmptyName,

    #[error("The new name can't be longer than {max} characters")]
    NameTooLong { max: usize },

    #[error("Passwords don't match")]
    PasswordMismatch,

    #[error("Pick at least one opening day")]
    NoOpeningDays,
}

fn min_len(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

/// Customer login: password of at least 5 characters.
pub fn validate_customer_login(_username: &str, password: &str) -> Result<(), ValidationError> {
    if !min_len(password, LOGIN_MIN_PASSWORD) {
        return Err(ValidationError::PasswordTooShort {
            min: LOGIN_MIN_PASSWORD,
        });
    }
    Ok(())
}

/// Seller login: store name of at least 2 and password of at least 5.
pub fn validate_seller_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if !min_len(username, SELLER_LOGIN_MIN_USERNAME) {
        return Err(ValidationError::UsernameTooShort {
            min: SELLER_LOGIN_MIN_USERNAME,
        });
    }
    validate_customer_login(username, password)
}

/// Any registration: username of at least 5, password of at least 8, and
/// the confirmation typed the same.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if !min_len(username, REGISTER_MIN_USERNAME) {
        return Err(ValidationError::UsernameTooShort {
            min: REGISTER_MIN_USERNAME,
        });
    }
    if !min_len(password, REGISTER_MIN_PASSWORD) {
        return Err(ValidationError::PasswordTooShort {
            min: REGISTER_MIN_PASSWORD,
        });
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// A new account or store name, trimmed. Must be non-empty and at most
/// 20 characters.
pub fn validate_new_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > NEW_NAME_MAX {
        return Err(ValidationError::NameTooLong { max: NEW_NAME_MAX });
    }
    Ok(name.to_string())
}

// ---------------------------------------------------------------------------
// Name conflicts
// ---------------------------------------------------------------------------

/// Fragments the backend uses when a username or store name is taken.
const NAME_CONFLICT_MARKERS: &[&str] = &[
    "unique",
    "duplicate",
    "already exists",
    "already taken",
    "not available",
];

/// Whether a rejection is about the chosen name being taken, as opposed
/// to some other input (dates, opening days) the server refused.
fn is_name_conflict(messages: &[String]) -> bool {
    messages.iter().any(|m| {
        let m = m.to_ascii_lowercase();
        NAME_CONFLICT_MARKERS.iter().any(|marker| m.contains(marker))
    })
}

/// A rejected create or rename: `NameNotAvailable(taken)` for a name
/// conflict, otherwise the server's own messages.
fn rejected_name(operation: &str, messages: Vec<String>, taken: &str) -> QueuelineError {
    if is_name_conflict(&messages) {
        debug!(operation, ?messages, "name not available");
        QueuelineError::NameNotAvailable(taken.to_string())
    } else {
        debug!(operation, ?messages, "rejected for another reason");
        QueuelineError::Rejected { messages }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Where the app opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchRoute {
    Home,
    Login,
}

pub(crate) async fn launch_route<K: KeyValueStore>(session: &SessionStore<K>) -> LaunchRoute {
    if session.is_logged_in().await {
        LaunchRoute::Home
    } else {
        LaunchRoute::Login
    }
}

/// A rename went through and the old credentials are void. The session
/// has been cleared; send the user to login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloginRequired {
    pub new_name: String,
}

impl ReloginRequired {
    pub fn message(&self) -> &'static str {
        "For security reasons, please log in again with the new credentials."
    }
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

pub(crate) async fn login<T, K>(
    client: &GraphQlClient<T, K>,
    username: &str,
    password: &str,
) -> Result<(), QueuelineError>
where
    T: Transport,
    K: KeyValueStore,
{
    let variables = CredentialsVariables {
        username: username.to_string(),
        password: password.to_string(),
    };
    let data = client.execute::<TokenAuth>(&variables).await?;
    let payload = data.token_auth;

    let session = client.session();
    session.set_session(&payload.token, true).await?;
    if let Some(user) = payload.user {
        // The session is already saved; a failed cache write only loses
        // the cached id.
        if let Err(e) = session.set_user_id(&user.id).await {
            warn!(error = %e, "could not cache user id");
        }
    }

    info!(username, "logged in");
    Ok(())
}

/// Creates an account with operation `O`, then logs in with the same
/// credentials. A rejected create is not followed by a login; a name
/// conflict becomes `NameNotAvailable(taken)`.
pub(crate) async fn register<O, T, K>(
    client: &GraphQlClient<T, K>,
    variables: &O::Variables,
    username: &str,
    password: &str,
    taken: &str,
) -> Result<(), QueuelineError>
where
    O: Operation,
    T: Transport,
    K: KeyValueStore,
{
    match client.execute::<O>(variables).await {
        Ok(_) => {}
        Err(QueuelineError::Rejected { messages }) => {
            return Err(rejected_name(O::NAME, messages, taken));
        }
        Err(e) => return Err(e),
    }
    info!(username, operation = O::NAME, "account created");
    login(client, username, password).await
}

pub(crate) async fn logout<T, K>(client: &GraphQlClient<T, K>) -> Result<(), QueuelineError>
where
    T: Transport,
    K: KeyValueStore,
{
    client.session().clear_session().await?;
    info!("logged out");
    Ok(())
}

/// Renames the account with operation `O`.
///
/// Polling is suspended before the request goes out. On success the
/// session is cleared and polling stays off; the rename is reported even
/// if clearing fails, since the server already holds the new name. If the
/// request fails for any other reason than an invalid session, the
/// previous polling options are restored; a name conflict becomes
/// `NameNotAvailable(taken)`.
pub(crate) async fn rotate_credentials<O, T, K>(
    client: &GraphQlClient<T, K>,
    polling: &PollingController,
    new_name: &str,
    taken: &str,
) -> Result<ReloginRequired, QueuelineError>
where
    O: Operation<Variables = NewNameVariables>,
    T: Transport,
    K: KeyValueStore,
{
    let new_name = validate_new_name(new_name)?;

    let previous = polling.suspend();
    info!(operation = O::NAME, "polling suspended for credential change");

    let variables = NewNameVariables {
        new_name: new_name.clone(),
    };
    match client.execute::<O>(&variables).await {
        Ok(_) => {
            match client.session().clear_session().await {
                Ok(()) => info!(operation = O::NAME, "credentials changed, session cleared"),
                Err(e) => warn!(
                    operation = O::NAME,
                    error = %e,
                    "credentials changed, session only partially cleared"
                ),
            }
            Ok(ReloginRequired { new_name })
        }
        Err(QueuelineError::Unauthorized) => Err(QueuelineError::Unauthorized),
        Err(QueuelineError::Rejected { messages }) => {
            polling.set_polling_options(previous);
            Err(rejected_name(O::NAME, messages, taken))
        }
        Err(e) => {
            polling.set_polling_options(previous);
            Err(e)
        }
    }
}
