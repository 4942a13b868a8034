//! End-to-end flows of both facades against a scripted GraphQL server.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use queueline::prelude::*;
use queueline::{ErrorKind, KeyValueStore, LocationError, Transport, ValidationError};
use queueline_session::StorageError;
use queueline_transport::{HttpRequest, HttpResponse, TransportError};
use serde_json::{Value, json};

// =========================================================================
// Scripted server
// =========================================================================

/// One request as the server saw it.
#[derive(Debug, Clone)]
struct Seen {
    operation: String,
    variables: Value,
    authorization: Option<String>,
    should_poll: Option<bool>,
}

/// Answers by `operationName`. Each operation has a queue of replies; the
/// last one repeats. Optionally samples a polling controller on every
/// request so tests can check what was allowed at send time.
#[derive(Default)]
struct ScriptedServer {
    replies: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    seen: Mutex<Vec<Seen>>,
    polling: Mutex<Option<PollingController>>,
}

impl ScriptedServer {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn reply(&self, operation: &str, body: Value) -> &Self {
        self.reply_status(operation, 200, body.to_string())
    }

    fn reply_status(&self, operation: &str, status: u16, body: String) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back((status, body));
        self
    }

    fn watch_polling(&self, controller: &PollingController) {
        *self.polling.lock().unwrap() = Some(controller.clone());
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn count(&self, operation: &str) -> usize {
        self.seen().iter().filter(|s| s.operation == operation).count()
    }

    fn last(&self, operation: &str) -> Seen {
        self.seen()
            .into_iter()
            .rev()
            .find(|s| s.operation == operation)
            .unwrap_or_else(|| panic!("{operation} was never sent"))
    }
}

impl Transport for ScriptedServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let operation = body["operationName"].as_str().unwrap().to_string();
        let should_poll = self.polling.lock().unwrap().as_ref().map(|c| c.should_poll());

        self.seen.lock().unwrap().push(Seen {
            operation: operation.clone(),
            variables: body["variables"].clone(),
            authorization: request.authorization.clone(),
            should_poll,
        });

        let mut replies = self.replies.lock().unwrap();
        let queue = replies
            .get_mut(&operation)
            .unwrap_or_else(|| panic!("no reply scripted for {operation}"));
        let (status, body) = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        };
        Ok(HttpResponse {
            status,
            body: body.into_bytes(),
        })
    }
}

// =========================================================================
// Failing storage
// =========================================================================

/// A memory store whose writes can be made to fail.
struct FlakyStore {
    inner: MemoryStore,
    fail_set: bool,
    fail_delete: bool,
}

impl FlakyStore {
    fn healthy() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_set: false,
            fail_delete: false,
        }
    }

    fn failing(fail_set: bool, fail_delete: bool) -> Self {
        Self {
            fail_set,
            fail_delete,
            ..Self::healthy()
        }
    }
}

impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_set {
            return Err(StorageError::Unavailable("cache full".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_delete {
            return Err(StorageError::Unavailable("cache locked".to_string()));
        }
        self.inner.delete(key).await
    }
}

/// A customer whose secure store works and whose cache store fails as asked.
fn customer_with_cache(
    server: &Arc<ScriptedServer>,
    cache: FlakyStore,
) -> Customer<Arc<ScriptedServer>, FlakyStore> {
    let session = Arc::new(SessionStore::new(FlakyStore::healthy(), cache));
    let client = GraphQlClient::new(Arc::clone(server), session);
    Customer::new(client, PollingController::new(), PollConfig::with_interval(INTERVAL))
}

type TestCustomer = Customer<Arc<ScriptedServer>, MemoryStore>;
type TestSeller = Seller<Arc<ScriptedServer>, MemoryStore>;

const INTERVAL: Duration = Duration::from_secs(3);

fn memory_session() -> Arc<SessionStore<MemoryStore>> {
    Arc::new(SessionStore::new(MemoryStore::new(), MemoryStore::new()))
}

fn customer(server: &Arc<ScriptedServer>) -> TestCustomer {
    let client = GraphQlClient::new(Arc::clone(server), memory_session());
    Customer::new(client, PollingController::new(), PollConfig::with_interval(INTERVAL))
}

fn seller(server: &Arc<ScriptedServer>) -> TestSeller {
    let client = GraphQlClient::new(Arc::clone(server), memory_session());
    Seller::new(client, PollingController::new(), PollConfig::with_interval(INTERVAL))
}

fn token_auth(token: &str) -> Value {
    json!({"data": {"tokenAuth": {"token": token, "user": {"id": "42", "username": "maria"}}}})
}

/// A GraphQL error with the partial `{field: null}` data servers send.
fn rejected(message: &str, field: &str) -> Value {
    let mut data = serde_json::Map::new();
    data.insert(field.to_string(), Value::Null);
    json!({"errors": [{"message": message}], "data": data})
}

/// A store whose queue holds the space-separated turn ids, in order.
fn store(name: &str, queue: &str) -> Value {
    let turns: Vec<Value> = queue.split_whitespace().map(|id| json!({"id": id})).collect();
    json!({"properties": {"name": name, "turns": turns}})
}

fn my_turns(entries: &[(&str, &str, &str)]) -> Value {
    let turns: Vec<Value> = entries
        .iter()
        .map(|(id, store_name, queue)| json!({"id": id, "store": store(store_name, queue)}))
        .collect();
    json!({"data": {"getTurnsForUser": turns}})
}

async fn logged_in_customer(server: &Arc<ScriptedServer>) -> TestCustomer {
    server.reply("TokenAuth", token_auth("JWT123"));
    let customer = customer(server);
    customer.login("maria", "hunter22").await.unwrap();
    customer
}

// =========================================================================
// Login and registration
// =========================================================================

#[tokio::test]
async fn test_login_persists_session_and_authorizes_next_request() {
    let server = ScriptedServer::new();
    server.reply("currentUser", json!({"data": {"user": {"id": "42", "fullName": "Maria"}}}));
    let customer = logged_in_customer(&server).await;

    let session = customer.client().session().session().await.unwrap();
    assert_eq!(session.token.as_deref(), Some("JWT123"));
    assert!(session.is_logged_in);
    assert_eq!(customer.client().session().user_id().await, Some(UserId::from("42")));

    let profile = customer.profile().await.unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Maria"));
    assert_eq!(server.last("currentUser").authorization.as_deref(), Some("JWT JWT123"));
    assert!(server.last("TokenAuth").authorization.is_none());
}

#[tokio::test]
async fn test_login_wrong_password_stays_logged_out() {
    let server = ScriptedServer::new();
    server.reply("TokenAuth", rejected("Please enter valid credentials", "tokenAuth"));
    let customer = customer(&server);

    let err = customer.login("maria", "wrong-pass").await.unwrap_err();

    assert!(matches!(err, QueuelineError::Rejected { .. }));
    assert_eq!(customer.launch_route().await, LaunchRoute::Login);
}

#[tokio::test]
async fn test_login_short_password_sends_nothing() {
    let server = ScriptedServer::new();
    let customer = customer(&server);

    let err = customer.login("maria", "1234").await.unwrap_err();

    assert!(matches!(
        err,
        QueuelineError::Validation(ValidationError::PasswordTooShort { min: 5 })
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(server.seen().is_empty());
}

#[tokio::test]
async fn test_register_taken_username_does_not_log_in() {
    let server = ScriptedServer::new();
    server.reply("createUser", rejected("duplicate key value", "createUser"));
    let customer = customer(&server);

    let err = customer.register("maria", "hunter22", "hunter22").await.unwrap_err();

    match err {
        QueuelineError::NameNotAvailable(message) => {
            assert_eq!(message, "This username is not available");
        }
        other => panic!("expected NameNotAvailable, got {other:?}"),
    }
    assert_eq!(server.count("TokenAuth"), 0);
    assert_eq!(customer.launch_route().await, LaunchRoute::Login);
}

#[tokio::test]
async fn test_register_then_logs_in_with_same_credentials() {
    let server = ScriptedServer::new();
    server
        .reply("createUser", json!({"data": {"createUser": {"user": {"id": "42"}}}}))
        .reply("TokenAuth", token_auth("JWT123"));
    let customer = customer(&server);

    customer.register("maria", "hunter22", "hunter22").await.unwrap();

    let sent = server.last("TokenAuth");
    assert_eq!(sent.variables, json!({"username": "maria", "password": "hunter22"}));
    assert_eq!(customer.launch_route().await, LaunchRoute::Home);
}

#[tokio::test]
async fn test_register_mismatched_confirmation_sends_nothing() {
    let server = ScriptedServer::new();
    let customer = customer(&server);

    let err = customer.register("maria", "hunter22", "hunter23").await.unwrap_err();

    assert!(matches!(
        err,
        QueuelineError::Validation(ValidationError::PasswordMismatch)
    ));
    assert_eq!(err.user_message(), "Passwords don't match");
    assert!(server.seen().is_empty());
}

#[tokio::test]
async fn test_login_cache_write_failure_still_logs_in() {
    let server = ScriptedServer::new();
    server.reply("TokenAuth", token_auth("JWT123"));
    let customer = customer_with_cache(&server, FlakyStore::failing(true, false));

    customer.login("maria", "hunter22").await.unwrap();

    let session = customer.client().session();
    assert_eq!(session.get_token().await.as_deref(), Some("JWT123"));
    assert_eq!(session.user_id().await, None);
    assert_eq!(customer.launch_route().await, LaunchRoute::Home);
}

#[tokio::test]
async fn test_register_cache_write_failure_still_logs_in() {
    let server = ScriptedServer::new();
    server
        .reply("createUser", json!({"data": {"createUser": {"user": {"id": "42"}}}}))
        .reply("TokenAuth", token_auth("JWT123"));
    let customer = customer_with_cache(&server, FlakyStore::failing(true, false));

    customer.register("maria", "hunter22", "hunter22").await.unwrap();

    assert_eq!(customer.launch_route().await, LaunchRoute::Home);
}

#[tokio::test]
async fn test_logout_routes_to_login() {
    let server = ScriptedServer::new();
    let customer = logged_in_customer(&server).await;
    assert_eq!(customer.launch_route().await, LaunchRoute::Home);

    customer.logout().await.unwrap();

    assert_eq!(customer.launch_route().await, LaunchRoute::Login);
    assert_eq!(customer.client().session().get_token().await, None);
    assert_eq!(customer.client().session().user_id().await, None);
}

#[tokio::test]
async fn test_relaunch_with_file_store_routes_home() {
    let dir = tempfile::tempdir().unwrap();
    let stores = || {
        SessionStore::new(
            FileStore::new(dir.path().join("secure.json")),
            FileStore::new(dir.path().join("cache.json")),
        )
    };
    let server = ScriptedServer::new();
    server.reply("TokenAuth", token_auth("JWT123"));

    let first = Customer::new(
        GraphQlClient::new(Arc::clone(&server), Arc::new(stores())),
        PollingController::new(),
        PollConfig::default(),
    );
    first.login("maria", "hunter22").await.unwrap();
    drop(first);

    let relaunched = Customer::new(
        GraphQlClient::new(Arc::clone(&server), Arc::new(stores())),
        PollingController::new(),
        PollConfig::default(),
    );
    assert_eq!(relaunched.launch_route().await, LaunchRoute::Home);
}

// =========================================================================
// Unauthorized responses
// =========================================================================

#[tokio::test]
async fn test_http_401_clears_session() {
    let server = ScriptedServer::new();
    server.reply_status("getTurnsForUser", 401, String::new());
    let customer = logged_in_customer(&server).await;

    let err = customer.my_turns().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(customer.launch_route().await, LaunchRoute::Login);
}

#[tokio::test]
async fn test_expired_token_in_body_clears_session() {
    let server = ScriptedServer::new();
    server.reply("getTurnsForUser", rejected("Signature has expired", "getTurnsForUser"));
    let customer = logged_in_customer(&server).await;

    let err = customer.my_turns().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(customer.client().session().get_token().await, None);
}

// =========================================================================
// Queues
// =========================================================================

#[tokio::test]
async fn test_my_turns_counts_people_ahead() {
    let server = ScriptedServer::new();
    server.reply(
        "getTurnsForUser",
        my_turns(&[("t2", "Bakery", "t9 t4 t2"), ("t5", "Pharmacy", "t5")]),
    );
    let customer = logged_in_customer(&server).await;

    let turns = customer.my_turns().await.unwrap();

    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].store_name(), "Bakery");
    assert_eq!(turns[0].people_ahead, Some(2));
    assert_eq!(turns[0].people_ahead_label(), "2 People ahead of you");
    assert_eq!(turns[1].people_ahead_label(), "It's your turn");
}

#[tokio::test]
async fn test_join_queue_sends_store_name() {
    let server = ScriptedServer::new();
    server.reply("createTurn", json!({"data": {"createTurn": {"turn": {"id": "t7"}}}}));
    let customer = logged_in_customer(&server).await;

    let turn = customer.join_queue("Bakery").await.unwrap();

    assert_eq!(turn.id, TurnId::from("t7"));
    assert_eq!(server.last("createTurn").variables, json!({"storeName": "Bakery"}));
}

#[tokio::test]
async fn test_cancel_turn_removes_it_from_next_poll() {
    let server = ScriptedServer::new();
    server
        .reply("getTurnsForUser", my_turns(&[("t7", "Bakery", "t7")]))
        .reply("getTurnsForUser", my_turns(&[]))
        .reply("cancelTurn", json!({"data": {"cancelTurn": {"turn": {"id": "t7"}}}}));
    let customer = logged_in_customer(&server).await;
    assert_eq!(customer.my_turns().await.unwrap().len(), 1);

    customer.cancel_turn(&TurnId::from("t7")).await.unwrap();

    assert_eq!(server.last("cancelTurn").variables, json!({"turnId": "t7"}));
    assert!(customer.my_turns().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_nearby_stores_here_denied_sends_nothing() {
    let server = ScriptedServer::new();
    let customer = customer(&server);

    let err = customer
        .nearby_stores_here(&FixedLocation::denied())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        QueuelineError::Location(LocationError::PermissionDenied)
    ));
    assert_eq!(err.kind(), ErrorKind::Location);
    assert!(server.seen().is_empty());
}

#[tokio::test]
async fn test_nearby_stores_here_uses_device_position() {
    let server = ScriptedServer::new();
    server.reply(
        "nearbyStores",
        json!({"data": {"nearbyStores": [store("Bakery", "")]}}),
    );
    let customer = logged_in_customer(&server).await;

    let stores = customer
        .nearby_stores_here(&FixedLocation::new(Coordinates::new(4.65, -74.05)))
        .await
        .unwrap();

    assert_eq!(stores[0].name(), "Bakery");
    assert_eq!(server.last("nearbyStores").variables, json!({"lat": 4.65, "lng": -74.05}));
}

// =========================================================================
// Renaming
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_rename_suspends_polling_before_request() {
    let server = ScriptedServer::new();
    server
        .reply("getTurnsForUser", my_turns(&[]))
        .reply("modifyUser", json!({"data": {"modifyUser": {"user": {"id": "42"}}}}));
    let customer = logged_in_customer(&server).await;
    server.watch_polling(customer.polling());

    let (_handle, mut rx) = customer.watch_my_turns();
    assert!(rx.recv().await.unwrap().is_ok());

    let relogin = customer.change_username("maria2").await.unwrap();

    assert_eq!(relogin.new_name, "maria2");
    let rename = server.last("modifyUser");
    assert_eq!(rename.should_poll, Some(false));
    assert_eq!(rename.variables, json!({"newName": "maria2"}));

    let polls = server.count("getTurnsForUser");
    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(server.count("getTurnsForUser"), polls);
    assert_eq!(customer.launch_route().await, LaunchRoute::Login);
}

#[tokio::test]
async fn test_rename_taken_restores_polling() {
    let server = ScriptedServer::new();
    server.reply("modifyUser", rejected("duplicate key value", "modifyUser"));
    let customer = logged_in_customer(&server).await;
    server.watch_polling(customer.polling());

    let err = customer.change_username("taken").await.unwrap_err();

    assert!(matches!(err, QueuelineError::NameNotAvailable(_)));
    assert_eq!(server.last("modifyUser").should_poll, Some(false));
    assert!(customer.polling().should_poll());
    assert_eq!(customer.launch_route().await, LaunchRoute::Home);
}

#[tokio::test]
async fn test_rename_clear_failure_still_requires_relogin() {
    let server = ScriptedServer::new();
    server
        .reply("TokenAuth", token_auth("JWT123"))
        .reply("modifyUser", json!({"data": {"modifyUser": {"user": {"id": "42"}}}}));
    let customer = customer_with_cache(&server, FlakyStore::failing(false, true));
    customer.login("maria", "hunter22").await.unwrap();

    let relogin = customer.change_username("maria2").await.unwrap();

    assert_eq!(relogin.new_name, "maria2");
    assert!(!customer.polling().should_poll());
    assert_eq!(customer.client().session().get_token().await, None);
    assert_eq!(customer.launch_route().await, LaunchRoute::Login);
}

#[tokio::test]
async fn test_rename_other_rejection_keeps_server_message() {
    let server = ScriptedServer::new();
    server.reply("modifyUser", rejected("Name contains invalid characters", "modifyUser"));
    let customer = logged_in_customer(&server).await;

    let err = customer.change_username("maria2").await.unwrap_err();

    match err {
        QueuelineError::Rejected { messages } => {
            assert_eq!(messages, vec!["Name contains invalid characters"]);
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert!(customer.polling().should_poll());
}

#[tokio::test]
async fn test_rename_blank_name_sends_nothing() {
    let server = ScriptedServer::new();
    let customer = logged_in_customer(&server).await;

    let err = customer.change_username("   ").await.unwrap_err();

    assert!(matches!(err, QueuelineError::Validation(ValidationError::EmptyName)));
    assert_eq!(server.count("modifyUser"), 0);
    assert!(customer.polling().should_poll());
}

// =========================================================================
// Seller
// =========================================================================

fn bakery(opening_time: &str) -> StoreRegistration {
    StoreRegistration {
        username: "Bakery".to_string(),
        password: "flourpower".to_string(),
        confirm_password: "flourpower".to_string(),
        location: Coordinates::new(4.65, -74.05),
        opening_time: opening_time.to_string(),
        closing_time: "2020-01-01T18:00:00".to_string(),
        opening_days: vec![Weekday::Monday, Weekday::Tuesday],
    }
}

#[tokio::test]
async fn test_register_store_taken_name() {
    let server = ScriptedServer::new();
    server.reply("createStore", rejected("duplicate key value", "createStore"));
    let seller = seller(&server);

    let err = seller.register_store(&bakery("2020-01-01T08:00:00")).await.unwrap_err();

    match err {
        QueuelineError::NameNotAvailable(message) => {
            assert_eq!(message, "The name of the store is not available");
        }
        other => panic!("expected NameNotAvailable, got {other:?}"),
    }
    assert_eq!(server.last("createStore").variables["openingDays"], json!(["MO", "TU"]));
    assert_eq!(server.count("TokenAuth"), 0);
}

#[tokio::test]
async fn test_register_store_bad_opening_time_keeps_server_message() {
    let message = "Variable \"$openingTime\" got invalid value \"8am\"";
    let server = ScriptedServer::new();
    server.reply("createStore", rejected(message, "createStore"));
    let seller = seller(&server);

    let err = seller.register_store(&bakery("8am")).await.unwrap_err();

    match err {
        QueuelineError::Rejected { ref messages } => assert_eq!(messages, &vec![message.to_string()]),
        ref other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(server.count("TokenAuth"), 0);
}

#[tokio::test]
async fn test_seller_serves_queue_and_reads_history() {
    let server = ScriptedServer::new();
    server
        .reply("TokenAuth", json!({"data": {"tokenAuth": {"token": "STORE1"}}}))
        .reply(
            "completeTurnSuccessfully",
            json!({"data": {"completeTurnSuccessfully": {"turn": {"id": "t1"}}}}),
        )
        .reply(
            "userDidNotPresent",
            json!({"data": {"userDidNotPresent": {"turn": {"id": "t2"}}}}),
        )
        .reply(
            "storeTurns",
            json!({"data": {"storeTurns": [
                {"id": "t1", "completionTime": "2020-01-01T10:00:00", "fullfilledSuccessfully": true},
                {"id": "t2", "completionTime": "2020-01-01T10:05:00", "userDidNotPresent": true},
            ]}}),
        );
    let seller = seller(&server);
    seller.login("Bakery", "flour").await.unwrap();

    seller.complete_turn(&TurnId::from("t1")).await.unwrap();
    seller.mark_absent(&TurnId::from("t2")).await.unwrap();
    let history = seller.turn_history().await.unwrap();

    assert_eq!(server.last("completeTurnSuccessfully").variables, json!({"turnId": "t1"}));
    assert_eq!(server.last("storeTurns").variables, json!({"completed": true}));
    let outcomes: Vec<TurnOutcome> = history.iter().map(|t| t.outcome).collect();
    assert_eq!(outcomes, vec![TurnOutcome::Fulfilled, TurnOutcome::NoShow]);
    assert_eq!(seller.client().session().user_id().await, None);
}

#[tokio::test]
async fn test_seller_login_short_store_name_sends_nothing() {
    let server = ScriptedServer::new();
    let seller = seller(&server);

    let err = seller.login("B", "flour").await.unwrap_err();

    assert!(matches!(
        err,
        QueuelineError::Validation(ValidationError::UsernameTooShort { min: 2 })
    ));
    assert!(server.seen().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_seller_rename_stops_pending_turns_watch() {
    let server = ScriptedServer::new();
    server
        .reply("TokenAuth", json!({"data": {"tokenAuth": {"token": "STORE1"}}}))
        .reply("storeTurns", json!({"data": {"storeTurns": [{"id": "t1"}]}}))
        .reply(
            "modifyStore",
            json!({"data": {"modifyStore": {"store": store("Bakery 2", "")}}}),
        );
    let seller = seller(&server);
    seller.login("Bakery", "flour").await.unwrap();
    server.watch_polling(seller.polling());

    let (_handle, mut rx) = seller.watch_pending_turns();
    assert_eq!(rx.recv().await.unwrap().unwrap().len(), 1);

    seller.rename_store("Bakery 2").await.unwrap();

    assert_eq!(server.last("modifyStore").should_poll, Some(false));
    let polls = server.count("storeTurns");
    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(server.count("storeTurns"), polls);
}
