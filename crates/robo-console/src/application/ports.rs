//! Interfaces to everything outside the application layer.
//!
//! Use cases receive these as `Arc<dyn Trait>` at construction time.  The
//! infrastructure layer provides the in-memory implementations; tests inject
//! their own.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use robo_core::{ControlAction, Store, Tablet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ── Documents ─────────────────────────────────────────────────────────────────

/// Field map of one stored document.
pub type Document = Map<String, Value>;

/// A document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: String,
    pub data: Document,
}

impl DocumentSnapshot {
    /// String field, if present and a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// Boolean field, if present and a boolean.
    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.data.get(name).and_then(Value::as_bool)
    }
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A collection query: equality filters plus an optional ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
    pub order: Option<(String, Direction)>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order: None,
        }
    }

    /// Keeps only documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    /// `true` when `doc` passes every filter.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    /// Orders two documents by the query's order field.
    ///
    /// Documents missing the field sort before those that have it.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let Some((field, direction)) = &self.order else {
            return Ordering::Equal;
        };
        let ord = compare_values(a.get(field), b.get(field));
        match direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Errors reported by the document store or the identity provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The service could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The caller lacks permission for the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The operation requires a signed-in user.
    #[error("no user is signed in")]
    NotSignedIn,

    /// The sign-in attempt was rejected.
    #[error("sign-in rejected for '{0}'")]
    SignInRejected(String),
}

/// Per-collection document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Runs `query` and returns the matching documents in query order.
    async fn query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>, BackendError>;

    /// Reads one document by id.
    async fn get(&self, collection: &str, id: &str)
        -> Result<Option<DocumentSnapshot>, BackendError>;

    /// Appends a document with a generated id and returns that id.
    async fn add(&self, collection: &str, data: Document) -> Result<String, BackendError>;

    /// Merges `data` into the document `id`, creating it if missing.
    async fn set_merge(&self, collection: &str, id: &str, data: Document)
        -> Result<(), BackendError>;
}

// ── Identity ──────────────────────────────────────────────────────────────────

/// The signed-in account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Authentication provider.
///
/// The provider only authenticates.  Who is signed in is tracked by each
/// caller's own session, so one provider can serve many sessions at once.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticates the account identified by `email`.
    async fn sign_in(&self, email: &str) -> Result<AuthUser, BackendError>;

    /// Ends `user`'s authentication.
    async fn sign_out(&self, user: &AuthUser) -> Result<(), BackendError>;
}

/// Handles to the backend services, built once at startup.
#[derive(Clone)]
pub struct BackendClient {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
}

impl BackendClient {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self { identity, store }
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}

// ── Fleet data sources ────────────────────────────────────────────────────────

/// Source of the store listing.
#[async_trait]
pub trait StoreCatalog: Send + Sync {
    async fn list_stores(&self) -> Result<Vec<Store>, BackendError>;
}

/// Delivers control actions to a tablet.
///
/// The shipped implementation is a simulation: it waits a fixed latency and
/// draws the acknowledgment at random.
#[async_trait]
pub trait DeviceLink: Send + Sync {
    /// Sends `action` and reports whether the tablet acknowledged it.
    async fn send(&self, tablet: &Tablet, action: ControlAction) -> bool;
}

/// Re-reads tablet status after a successful refresh action.
#[async_trait]
pub trait StatusRefresher: Send + Sync {
    async fn refresh(&self);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
