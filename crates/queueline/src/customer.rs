//! The customer application facade.

use std::sync::Arc;

use queueline_poll::{PollConfig, PollHandle, PollingController, spawn_poller};
use queueline_protocol::ops::{
    CancelTurn, CreateTurn, CreateUser, CredentialsVariables, CurrentUser, LocationVariables,
    ModifyUser, NearbyStores, NoVariables, SearchStore, SearchStoreVariables, StoreDetail,
    StoreDetailVariables, StoreNameVariables, TurnIdVariables, TurnsForUser,
};
use queueline_protocol::{Coordinates, StoreFeature, Turn, TurnId, User};
use queueline_queue::{people_ahead_label, position_in_store};
use queueline_session::KeyValueStore;
use queueline_transport::Transport;
use tokio::sync::mpsc;
use tracing::info;

use crate::auth::{self, LaunchRoute, ReloginRequired};
use crate::{GraphQlClient, LocationProvider, QueuelineError, validate_customer_login};

const USERNAME_TAKEN: &str = "This username is not available";

/// One of the customer's active turns, with its place in the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct MyTurn {
    pub turn: Turn,
    /// People ahead, by the server's queue order. `None` if the store's
    /// queue didn't include this turn.
    pub people_ahead: Option<usize>,
}

impl MyTurn {
    fn new(turn: Turn) -> Self {
        let people_ahead = position_in_store(&turn);
        Self { turn, people_ahead }
    }

    pub fn store_name(&self) -> &str {
        self.turn.store.as_ref().map_or("", StoreFeature::name)
    }

    pub fn people_ahead_label(&self) -> String {
        match self.people_ahead {
            Some(n) => people_ahead_label(n),
            None => "Position unknown".to_string(),
        }
    }
}

struct Inner<T, K> {
    client: GraphQlClient<T, K>,
    polling: PollingController,
    poll_config: PollConfig,
}

/// Everything the customer app does.
///
/// Cheap to clone; clones share the client, session, and polling
/// controller.
pub struct Customer<T, K> {
    inner: Arc<Inner<T, K>>,
}

impl<T, K> Clone for Customer<T, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport, K: KeyValueStore> Customer<T, K> {
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

    pub async fn login(&self, username: &str, password: &str) -> Result<(), QueuelineError> {
        validate_customer_login(username, password)?;
        auth::login(&self.inner.client, username, password).await
    }

    /// Creates the account and logs in with it.
    ///
    /// # Errors
    /// [`QueuelineError::NameNotAvailable`] if the username is taken; no
    /// login is attempted in that case.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), QueuelineError> {
        crate::validate_registration(username, password, confirm_password)?;
        let variables = CredentialsVariables {
            username: username.to_string(),
            password: password.to_string(),
        };
        auth::register::<CreateUser, _, _>(
            &self.inner.client,
            &variables,
            username,
            password,
            USERNAME_TAKEN,
        )
        .await
    }

    pub async fn logout(&self) -> Result<(), QueuelineError> {
        auth::logout(&self.inner.client).await
    }

    pub async fn launch_route(&self) -> LaunchRoute {
        auth::launch_route(self.inner.client.session()).await
    }

    pub async fn profile(&self) -> Result<User, QueuelineError> {
        Ok(self.inner.client.execute::<CurrentUser>(&NoVariables {}).await?.user)
    }

    /// Changes the username. Polling is suspended before the request.
    ///
    /// # Errors
    /// [`QueuelineError::NameNotAvailable`] if the name is taken; polling
    /// is restored in that case.
    pub async fn change_username(&self, new_name: &str) -> Result<ReloginRequired, QueuelineError> {
        auth::rotate_credentials::<ModifyUser, _, _>(
            &self.inner.client,
            &self.inner.polling,
            new_name,
            USERNAME_TAKEN,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Stores
    // -----------------------------------------------------------------------

    pub async fn nearby_stores(&self, around: Coordinates) -> Result<Vec<StoreFeature>, QueuelineError> {
        let variables = LocationVariables {
            lat: around.latitude,
            lng: around.longitude,
        };
        Ok(self.inner.client.execute::<NearbyStores>(&variables).await?.nearby_stores)
    }

    /// Nearby stores around the device's current position.
    pub async fn nearby_stores_here<L: LocationProvider>(
        &self,
        location: &L,
    ) -> Result<Vec<StoreFeature>, QueuelineError> {
        let here = location.current_position().await?;
        self.nearby_stores(here).await
    }

    pub async fn search_stores(
        &self,
        query: &str,
        around: Coordinates,
    ) -> Result<Vec<StoreFeature>, QueuelineError> {
        let variables = SearchStoreVariables {
            query: query.to_string(),
            lat: around.latitude,
            lng: around.longitude,
        };
        Ok(self.inner.client.execute::<SearchStore>(&variables).await?.search_store)
    }

    /// A store with its whole queue.
    pub async fn store_detail(&self, name: &str) -> Result<StoreFeature, QueuelineError> {
        let variables = StoreDetailVariables {
            name: name.to_string(),
        };
        Ok(self.inner.client.execute::<StoreDetail>(&variables).await?.store_detail)
    }

    // -----------------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------------

    pub async fn join_queue(&self, store_name: &str) -> Result<Turn, QueuelineError> {
        let variables = StoreNameVariables {
            store_name: store_name.to_string(),
        };
        let turn = self
            .inner
            .client
            .execute::<CreateTurn>(&variables)
            .await?
            .create_turn
            .turn;
        info!(store = store_name, turn_id = %turn.id, "joined queue");
        Ok(turn)
    }

    /// Leaves a queue.
    pub async fn cancel_turn(&self, turn_id: &TurnId) -> Result<Turn, QueuelineError> {
        let variables = TurnIdVariables {
            turn_id: turn_id.clone(),
        };
        let turn = self
            .inner
            .client
            .execute::<CancelTurn>(&variables)
            .await?
            .cancel_turn
            .turn;
        info!(%turn_id, "turn canceled");
        Ok(turn)
    }

    /// Active turns, each with the number of people ahead.
    pub async fn my_turns(&self) -> Result<Vec<MyTurn>, QueuelineError> {
        let turns = self
            .inner
            .client
            .execute::<TurnsForUser>(&NoVariables {})
            .await?
            .get_turns_for_user;
        Ok(turns.into_iter().map(MyTurn::new).collect())
    }

    // -----------------------------------------------------------------------
    // Live screens
    // -----------------------------------------------------------------------

    /// Polls [`my_turns`](Self::my_turns) while polling is allowed. Drop or
    /// stop the handle when the screen goes away.
    pub fn watch_my_turns(
        &self,
    ) -> (PollHandle, mpsc::Receiver<Result<Vec<MyTurn>, QueuelineError>>) {
        let this = self.clone();
        spawn_poller(
            self.inner.polling.clone(),
            self.inner.poll_config.clone(),
            move || {
                let this = this.clone();
                async move { this.my_turns().await }
            },
        )
    }

    /// Polls [`store_detail`](Self::store_detail) for one store.
    pub fn watch_store(
        &self,
        name: &str,
    ) -> (PollHandle, mpsc::Receiver<Result<StoreFeature, QueuelineError>>) {
        let this = self.clone();
        let name = name.to_string();
        spawn_poller(
            self.inner.polling.clone(),
            self.inner.poll_config.clone(),
            move || {
                let this = this.clone();
                let name = name.clone();
                async move { this.store_detail(&name).await }
            },
        )
    }
}
