//! Records that travel on the wire.
//!
//! Every type here mirrors a shape the queue service returns (or accepts).
//! The server owns all of these records; the apps only read them and ask
//! for transitions through named mutations.
//!
//! Field names on the wire are camelCase, so most structs carry
//! `#[serde(rename_all = "camelCase")]`. Almost every field is optional or
//! defaulted because each query selects a different subset of fields:
//! `getTurnsForUser` returns turns without a `creationTime`, `storeTurns`
//! returns turns without a `store`, and so on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Server identifier of a turn (GraphQL `ID`, always a string on the wire).
///
/// A newtype so a turn id can't be passed where a user id is expected,
/// even though both are strings underneath. `#[serde(transparent)]` makes
/// it serialize as the bare string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub String);

impl TurnId {
    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TurnId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TurnId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Server identifier of an authenticated account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A point on the map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// GeoJSON geometry of a store. Only points are used.
///
/// GeoJSON orders coordinates `[longitude, latitude]`, the opposite of
/// what people usually write, so use [`Geometry::point`] instead of
/// indexing by hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl Geometry {
    /// The point this geometry describes, or `None` if the server sent
    /// fewer than two coordinates.
    pub fn point(&self) -> Option<Coordinates> {
        match self.coordinates.as_slice() {
            [longitude, latitude, ..] => Some(Coordinates::new(*latitude, *longitude)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// A day of the week as the `createStore` mutation expects it.
///
/// The server's `Weekdays` enum uses two-letter codes; read queries,
/// however, return `openingDays` as English names joined by `", "`.
/// [`Weekday`] parses both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "MO")]
    Monday,
    #[serde(rename = "TU")]
    Tuesday,
    #[serde(rename = "WE")]
    Wednesday,
    #[serde(rename = "TH")]
    Thursday,
    #[serde(rename = "FR")]
    Friday,
    #[serde(rename = "SA")]
    Saturday,
    #[serde(rename = "SU")]
    Sunday,
}

impl Weekday {
    /// All days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Two-letter wire code (`"MO"`).
    pub fn code(self) -> &'static str {
        match self {
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }

    /// English name as read queries return it (`"Monday"`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// `true` for Monday through Friday.
    pub fn is_weekday(self) -> bool {
        !matches!(self, Self::Saturday | Self::Sunday)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = ProtocolError;

    /// Accepts the wire code or the English name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(s) || d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProtocolError::InvalidValue(format!("unknown weekday `{s}`")))
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// The authentication record behind a customer profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
}

/// A customer profile (`user` query).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// The person a turn belongs to, as nested inside turn records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnMember {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

impl TurnMember {
    /// The account id behind this member, when the query selected it.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Store attributes (the `properties` half of the GeoJSON feature).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProperties {
    pub name: String,
    #[serde(default)]
    pub opening_time: Option<String>,
    #[serde(default)]
    pub closing_time: Option<String>,
    /// English day names joined by `", "`.
    #[serde(default)]
    pub opening_days: Option<String>,
    #[serde(default)]
    pub average_wait_time: Option<f64>,
    #[serde(default)]
    pub is_open: Option<bool>,
    /// The store's queue, in the server's order.
    #[serde(default)]
    pub turns: Option<Vec<Turn>>,
}

/// A store as the API returns it: a GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreFeature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    pub properties: StoreProperties,
}

impl StoreFeature {
    /// The store's name.
    pub fn name(&self) -> &str {
        &self.properties.name
    }

    /// The store's location, if the query selected its geometry.
    pub fn location(&self) -> Option<Coordinates> {
        self.geometry.as_ref().and_then(Geometry::point)
    }

    /// The queue, in server order. Empty when not selected.
    pub fn turns(&self) -> &[Turn] {
        self.properties.turns.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Turns
// ---------------------------------------------------------------------------

/// One person's entry in a store's queue.
///
/// Server invariant: on a completed turn at most one of
/// `fulfilled_successfully`, `canceled`, `user_did_not_present` is true.
/// The client doesn't rely on it; see `queueline_queue::TurnOutcome`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: TurnId,
    #[serde(default)]
    pub creation_time: Option<String>,
    #[serde(default)]
    pub completion_time: Option<String>,
    /// Spelled `fullfilledSuccessfully` by the API.
    #[serde(default, rename = "fullfilledSuccessfully")]
    pub fulfilled_successfully: Option<bool>,
    #[serde(default)]
    pub canceled: Option<bool>,
    #[serde(default)]
    pub user_did_not_present: Option<bool>,
    #[serde(default)]
    pub user: Option<TurnMember>,
    #[serde(default)]
    pub store: Option<StoreFeature>,
}

impl Turn {
    /// A turn with only its id set, as the mutations return it.
    pub fn with_id(id: impl Into<TurnId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Display name of the person holding this turn.
    pub fn member_name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.full_name.as_deref())
    }
}
