//! Every query and mutation the apps send.
//!
//! Each operation is a zero-sized marker type implementing [`Operation`]:
//! its GraphQL document, its variables struct, and the struct its `data`
//! decodes into. The client code then reads like
//! `client.execute::<CancelTurn>(&TurnIdVariables { turn_id })`.
//!
//! Grouped as:
//! - **Authentication**: [`TokenAuth`], [`CreateUser`], [`CreateStore`]
//! - **Queue transitions**: [`CreateTurn`], [`CancelTurn`],
//!   [`CompleteTurnSuccessfully`], [`UserDidNotPresent`]
//! - **Profile** (rotate credentials): [`ModifyUser`], [`ModifyStore`]
//! - **Reads**: [`CurrentUser`], [`CurrentStore`], [`NearbyStores`],
//!   [`SearchStore`], [`StoreDetail`], [`TurnsForUser`], [`StoreTurns`]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AuthUser, Operation, StoreFeature, Turn, TurnId, User, Weekday};

// ---------------------------------------------------------------------------
// Shared variables and payloads
// ---------------------------------------------------------------------------

/// For operations that take no variables. Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables {}

/// `$username`, `$password`.
#[derive(Clone, Serialize)]
pub struct CredentialsVariables {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CredentialsVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsVariables")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `$turnId`, shared by every turn transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnIdVariables {
    pub turn_id: TurnId,
}

/// `$newName`, shared by both rename mutations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNameVariables {
    pub new_name: String,
}

/// `{ turn { id } }`, what every turn mutation returns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TurnPayload {
    pub turn: Turn,
}

/// `{ store { properties { name } } }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorePayload {
    pub store: StoreFeature,
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Exchange credentials for a session token.
pub struct TokenAuth;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenAuthPayload {
    pub token: String,
    /// Returned by the customer backend; stores may omit it.
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenAuthData {
    #[serde(rename = "tokenAuth")]
    pub token_auth: TokenAuthPayload,
}

impl Operation for TokenAuth {
    const NAME: &'static str = "TokenAuth";
    const DOCUMENT: &'static str = "\
mutation TokenAuth($username: String!, $password: String!) {
  tokenAuth(username: $username, password: $password) {
    token
    user {
      id
    }
  }
}";
    const IS_MUTATION: bool = true;
    type Variables = CredentialsVariables;
    type Data = TokenAuthData;
}

/// Register a customer account.
pub struct CreateUser;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateUserPayload {
    pub user: AuthUser,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateUserData {
    #[serde(rename = "createUser")]
    pub create_user: CreateUserPayload,
}

impl Operation for CreateUser {
    const NAME: &'static str = "createUser";
    const DOCUMENT: &'static str = "\
mutation createUser($username: String!, $password: String!) {
  createUser(username: $username, password: $password) {
    user {
      id
    }
  }
}";
    const IS_MUTATION: bool = true;
    type Variables = CredentialsVariables;
    type Data = CreateUserData;
}

/// Register a store account, with its location and schedule.
pub struct CreateStore;

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreVariables {
    pub username: String,
    pub password: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `DateTime` scalar, ISO 8601.
    pub opening_time: String,
    /// `DateTime` scalar, ISO 8601.
    pub closing_time: String,
    pub opening_days: Vec<Weekday>,
}

impl fmt::Debug for CreateStoreVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateStoreVariables")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("opening_time", &self.opening_time)
            .field("closing_time", &self.closing_time)
            .field("opening_days", &self.opening_days)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateStoreData {
    #[serde(rename = "createStore")]
    pub create_store: StorePayload,
}

impl Operation for CreateStore {
    const NAME: &'static str = "createStore";
    const DOCUMENT: &'static str = "\
mutation createStore(
  $username: String!
  $password: String!
  $latitude: Float!
  $longitude: Float!
  $openingTime: DateTime!
  $closingTime: DateTime!
  $openingDays: [Weekdays]!
) {
  createStore(
    username: $username
    password: $password
    latitude: $latitude
    longitude: $longitude
    openingTime: $openingTime
    closingTime: $closingTime
    openingDays: $openingDays
  ) {
    store {
      properties {
        name
      }
    }
  }
}";
    const IS_MUTATION: bool = true;
    type Variables = CreateStoreVariables;
    type Data = CreateStoreData;
}

// ---------------------------------------------------------------------------
// Queue transitions
// ---------------------------------------------------------------------------

/// Join a store's queue.
pub struct CreateTurn;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreNameVariables {
    pub store_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateTurnData {
    #[serde(rename = "createTurn")]
    pub create_turn: TurnPayload,
}

impl Operation for CreateTurn {
    const NAME: &'static str = "createTurn";
    const DOCUMENT: &'static str = "\
mutation createTurn($storeName: String!) {
  createTurn(storeName: $storeName) {
    turn {
      id
    }
  }
}";
    const IS_MUTATION: bool = true;
    type Variables = StoreNameVariables;
    type Data = CreateTurnData;
}

/// Leave a queue (customer) or remove someone from it (seller).
pub struct CancelTurn;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CancelTurnData {
    #[serde(rename = "cancelTurn")]
    pub cancel_turn: TurnPayload,
}

impl Operation for CancelTurn {
    const NAME: &'static str = "cancelTurn";
    const DOCUMENT: &'static str = "\
mutation cancelTurn($turnId: ID!) {
  cancelTurn(turnId: $turnId) {
    turn {
      id
    }
  }
}";
    const IS_MUTATION: bool = true;
    type Variables = TurnIdVariables;
    type Data = CancelTurnData;
}

/// Mark a turn as served.
pub struct CompleteTurnSuccessfully;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompleteTurnData {
    #[serde(rename = "completeTurnSuccessfully")]
    pub complete_turn_successfully: TurnPayload,
}

impl Operation for CompleteTurnSuccessfully {
    const NAME: &'static str = "completeTurnSuccessfully";
    const DOCUMENT: &'static str = "\
mutation completeTurnSuccessfully($turnId: ID!) {
  completeTurnSuccessfully(turnId: $turnId) {
    turn {
      id
    }
  }
}";
    const IS_MUTATION: bool = true;
    type Variables = TurnIdVariables;
    type Data = CompleteTurnData;
}

/// Mark a turn as a no-show.
pub struct UserDidNotPresent;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserDidNotPresentData {
    #[serde(rename = "userDidNotPresent")]
    pub user_did_not_present: TurnPayload,
}

impl Operation for UserDidNotPresent {
    const NAME: &'static str = "userDidNotPresent";
    const DOCUMENT: &'static str = "\
mutation userDidNotPresent($turnId: ID!) {
  userDidNotPresent(turnId: $turnId) {
    turn {
      id
    }
  }
}";
    const IS_MUTATION: bool = true;
    type Variables = TurnIdVariables;
    type Data = UserDidNotPresentData;
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Rename the customer account. Invalidates the current token.
pub struct ModifyUser;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModifyUserPayload {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModifyUserData {
    #[serde(rename = "modifyUser")]
    pub modify_user: ModifyUserPayload,
}

impl Operation for ModifyUser {
    const NAME: &'static str = "modifyUser";
    const DOCUMENT: &'static str = "\
mutation modifyUser($newName: String!) {
  modifyUser(newName: $newName) {
    user {
      fullName
    }
  }
}";
    const IS_MUTATION: bool = true;
    type Variables = NewNameVariables;
    type Data = ModifyUserData;
}

/// Rename the store account. Invalidates the current token.
pub struct ModifyStore;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModifyStoreData {
    #[serde(rename = "modifyStore")]
    pub modify_store: StorePayload,
}

impl Operation for ModifyStore {
    const NAME: &'static str = "modifyStore";
    const DOCUMENT: &'static str = "\
mutation modifyStore($newName: String!) {
  modifyStore(newName: $newName) {
    store {
      properties {
        name
      }
    }
  }
}";
    const IS_MUTATION: bool = true;
    type Variables = NewNameVariables;
    type Data = ModifyStoreData;
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// The logged-in customer's profile.
pub struct CurrentUser;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentUserData {
    pub user: User,
}

impl Operation for CurrentUser {
    const NAME: &'static str = "currentUser";
    const DOCUMENT: &'static str = "\
query currentUser {
  user {
    id
    fullName
  }
}";
    const IS_MUTATION: bool = false;
    type Variables = NoVariables;
    type Data = CurrentUserData;
}

/// The logged-in seller's store.
pub struct CurrentStore;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentStoreData {
    pub store: StoreFeature,
}

impl Operation for CurrentStore {
    const NAME: &'static str = "currentStore";
    const DOCUMENT: &'static str = "\
query currentStore {
  store {
    properties {
      name
      openingTime
      closingTime
      openingDays
    }
  }
}";
    const IS_MUTATION: bool = false;
    type Variables = NoVariables;
    type Data = CurrentStoreData;
}

/// `$lat`, `$lng`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LocationVariables {
    pub lat: f64,
    pub lng: f64,
}

/// Stores around a point.
pub struct NearbyStores;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NearbyStoresData {
    #[serde(rename = "nearbyStores")]
    pub nearby_stores: Vec<StoreFeature>,
}

impl Operation for NearbyStores {
    const NAME: &'static str = "nearbyStores";
    const DOCUMENT: &'static str = "\
query nearbyStores($lat: Float!, $lng: Float!) {
  nearbyStores(lat: $lat, lng: $lng) {
    properties {
      name
      openingTime
      closingTime
      openingDays
      averageWaitTime
    }
    geometry {
      coordinates
    }
  }
}";
    const IS_MUTATION: bool = false;
    type Variables = LocationVariables;
    type Data = NearbyStoresData;
}

/// Stores matching a text query, ranked around a point.
pub struct SearchStore;

#[derive(Debug, Clone, Serialize)]
pub struct SearchStoreVariables {
    pub query: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchStoreData {
    #[serde(rename = "searchStore")]
    pub search_store: Vec<StoreFeature>,
}

impl Operation for SearchStore {
    const NAME: &'static str = "searchStore";
    const DOCUMENT: &'static str = "\
query searchStore($query: String!, $lat: Float!, $lng: Float!) {
  searchStore(query: $query, lat: $lat, lng: $lng) {
    properties {
      name
      openingTime
      closingTime
      openingDays
      averageWaitTime
    }
    geometry {
      coordinates
    }
  }
}";
    const IS_MUTATION: bool = false;
    type Variables = SearchStoreVariables;
    type Data = SearchStoreData;
}

/// One store with its current queue.
pub struct StoreDetail;

#[derive(Debug, Clone, Serialize)]
pub struct StoreDetailVariables {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreDetailData {
    #[serde(rename = "storeDetail")]
    pub store_detail: StoreFeature,
}

impl Operation for StoreDetail {
    const NAME: &'static str = "storeDetail";
    const DOCUMENT: &'static str = "\
query storeDetail($name: String!) {
  storeDetail(name: $name) {
    geometry {
      coordinates
    }
    properties {
      name
      openingTime
      closingTime
      isOpen
      openingDays
      turns {
        id
        user {
          user {
            id
            username
          }
        }
      }
    }
  }
}";
    const IS_MUTATION: bool = false;
    type Variables = StoreDetailVariables;
    type Data = StoreDetailData;
}

/// The customer's active turns, each with its store's whole queue.
pub struct TurnsForUser;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TurnsForUserData {
    #[serde(rename = "getTurnsForUser")]
    pub get_turns_for_user: Vec<Turn>,
}

impl Operation for TurnsForUser {
    const NAME: &'static str = "getTurnsForUser";
    const DOCUMENT: &'static str = "\
query getTurnsForUser {
  getTurnsForUser {
    id
    store {
      properties {
        name
        turns {
          id
        }
      }
    }
  }
}";
    const IS_MUTATION: bool = false;
    type Variables = NoVariables;
    type Data = TurnsForUserData;
}

/// The seller's turns, pending (`completed: false`) or history.
pub struct StoreTurns;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreTurnsVariables {
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreTurnsData {
    #[serde(rename = "storeTurns")]
    pub store_turns: Vec<Turn>,
}

impl Operation for StoreTurns {
    const NAME: &'static str = "storeTurns";
    const DOCUMENT: &'static str = "\
query storeTurns($completed: Boolean!) {
  storeTurns(completed: $completed) {
    id
    creationTime
    completionTime
    fullfilledSuccessfully
    canceled
    userDidNotPresent
    user {
      fullName
    }
  }
}";
    const IS_MUTATION: bool = false;
    type Variables = StoreTurnsVariables;
    type Data = StoreTurnsData;
}
