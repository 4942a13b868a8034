//! The seller application facade.

use std::sync::Arc;

use queueline_poll::{PollConfig, PollHandle, PollingController, spawn_poller};
use queueline_protocol::ops::{
    CancelTurn, CompleteTurnSuccessfully, CreateStore, CreateStoreVariables, CurrentStore,
    ModifyStore, NoVariables, StoreTurns, StoreTurnsVariables, TurnIdVariables, UserDidNotPresent,
};
use queueline_protocol::{Coordinates, StoreFeature, Turn, TurnId, Weekday};
use queueline_queue::TurnOutcome;
use queueline_session::KeyValueStore;
use queueline_transport::Transport;
use tokio::sync::mpsc;
use tracing::info;

use crate::auth::{self, LaunchRoute, ReloginRequired};
use crate::{GraphQlClient, QueuelineError, ValidationError, validate_registration, validate_seller_login};

const STORE_NAME_TAKEN: &str = "The name of the store is not available";

/// What it takes to open a store.
#[derive(Clone)]
pub struct StoreRegistration {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub location: Coordinates,
    /// `DateTime` scalar, ISO 8601.
    pub opening_time: String,
    /// `DateTime` scalar, ISO 8601.
    pub closing_time: String,
    pub opening_days: Vec<Weekday>,
}

impl StoreRegistration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_registration(&self.username, &self.password, &self.confirm_password)?;
        if self.opening_days.is_empty() {
            return Err(ValidationError::NoOpeningDays);
        }
        Ok(())
    }

    fn variables(&self) -> CreateStoreVariables {
        CreateStoreVariables {
            username: self.username.clone(),
            password: self.password.clone(),
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            opening_time: self.opening_time.clone(),
            closing_time: self.closing_time.clone(),
            opening_days: self.opening_days.clone(),
        }
    }
}

impl std::fmt::Debug for StoreRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .field("location", &self.location)
            .field("opening_time", &self.opening_time)
            .field("closing_time", &self.closing_time)
            .field("opening_days", &self.opening_days)
            .finish()
    }
}

/// A completed turn and how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTurn {
    pub turn: Turn,
    pub outcome: TurnOutcome,
}

impl ClosedTurn {
    fn new(turn: Turn) -> Self {
        let outcome = TurnOutcome::classify(&turn);
        Self { turn, outcome }
    }
}

struct Inner<T, K> {
    client: GraphQlClient<T, K>,
    polling: PollingController,
    poll_config: PollConfig,
}

/// Everything the seller app does. Clones share state.
pub struct Seller<T, K> {
    inner: Arc<Inner<T, K>>,
}

impl<T, K> Clone for Seller<T, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport, K: KeyValueStore> Seller<T, K> {
    pub fn new(client: GraphQlClient<T, K>, polling: PollingController, poll_config: PollConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                polling,
                poll_config,
            }),
        }
    }

    pub fn client(&self) -> &GraphQlClient<T, K> {
        &self.inner.client
    }

    pub fn polling(&self) -> &PollingController {
        &self.inner.polling
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    pub async fn login(&self, store_name: &str, password: &str) -> Result<(), QueuelineError> {
        validate_seller_login(store_name, password)?;
        auth::login(&self.inner.client, store_name, password).await
    }

    /// Creates the store and logs in as it.
    ///
    /// # Errors
    /// [`QueuelineError::NameNotAvailable`] if the store name is taken.
    pub async fn register_store(&self, registration: &StoreRegistration) -> Result<(), QueuelineError> {
        registration.validate()?;
        auth::register::<CreateStore, _, _>(
            &self.inner.client,
            &registration.variables(),
            &registration.username,
            &registration.password,
            STORE_NAME_TAKEN,
        )
        .await
    }

    pub async fn logout(&self) -> Result<(), QueuelineError> {
        auth::logout(&self.inner.client).await
    }

    pub async fn launch_route(&self) -> LaunchRoute {
        auth::launch_route(self.inner.client.session()).await
    }

    pub async fn store(&self) -> Result<StoreFeature, QueuelineError> {
        Ok(self.inner.client.execute::<CurrentStore>(&NoVariables {}).await?.store)
    }

    /// Renames the store. Polling is suspended before the request and, on
    /// success, stays off until the next login.
    pub async fn rename_store(&self, new_name: &str) -> Result<ReloginRequired, QueuelineError> {
        auth::rotate_credentials::<ModifyStore, _, _>(
            &self.inner.client,
            &self.inner.polling,
            new_name,
            STORE_NAME_TAKEN,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Queue
    // -----------------------------------------------------------------------

    /// The store's queue, in server order.
    pub async fn pending_turns(&self) -> Result<Vec<Turn>, QueuelineError> {
        let variables = StoreTurnsVariables { completed: false };
        Ok(self.inner.client.execute::<StoreTurns>(&variables).await?.store_turns)
    }

    pub async fn turn_history(&self) -> Result<Vec<ClosedTurn>, QueuelineError> {
        let variables = StoreTurnsVariables { completed: true };
        let turns = self.inner.client.execute::<StoreTurns>(&variables).await?.store_turns;
        Ok(turns.into_iter().map(ClosedTurn::new).collect())
    }

    pub async fn cancel_turn(&self, turn_id: &TurnId) -> Result<Turn, QueuelineError> {
        let turn = self
            .inner
            .client
            .execute::<CancelTurn>(&turn_variables(turn_id))
            .await?
            .cancel_turn
            .turn;
        info!(%turn_id, "turn canceled by store");
        Ok(turn)
    }

    /// Marks the customer as served.
    pub async fn complete_turn(&self, turn_id: &TurnId) -> Result<Turn, QueuelineError> {
        let turn = self
            .inner
            .client
            .execute::<CompleteTurnSuccessfully>(&turn_variables(turn_id))
            .await?
            .complete_turn_successfully
            .turn;
        info!(%turn_id, "turn completed");
        Ok(turn)
    }

    /// Marks the customer as a no-show.
    pub async fn mark_absent(&self, turn_id: &TurnId) -> Result<Turn, QueuelineError> {
        let turn = self
            .inner
            .client
            .execute::<UserDidNotPresent>(&turn_variables(turn_id))
            .await?
            .user_did_not_present
            .turn;
        info!(%turn_id, "customer did not present");
        Ok(turn)
    }

    // -----------------------------------------------------------------------
    // Live screens
    // -----------------------------------------------------------------------

    pub fn watch_pending_turns(&self) -> (PollHandle, mpsc::Receiver<Result<Vec<Turn>, QueuelineError>>) {
        let this = self.clone();
        spawn_poller(
            self.inner.polling.clone(),
            self.inner.poll_config.clone(),
            move || {
                let this = this.clone();
                async move { this.pending_turns().await }
            },
        )
    }

    pub fn watch_history(&self) -> (PollHandle, mpsc::Receiver<Result<Vec<ClosedTurn>, QueuelineError>>) {
        let this = self.clone();
        spawn_poller(
            self.inner.polling.clone(),
            self.inner.poll_config.clone(),
            move || {
                let this = this.clone();
                async move { this.turn_history().await }
            },
        )
    }
}

fn turn_variables(turn_id: &TurnId) -> TurnIdVariables {
    TurnIdVariables {
        turn_id: turn_id.clone(),
    }
}
