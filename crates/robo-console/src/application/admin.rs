//! AdminService: operator-only workflows.
//!
//! An *operator* is a user whose email appears in the `admins` collection.
//! Operators can list every registered user and register a tablet's MAC
//! address on a user's behalf, which creates the tablet record the user's
//! dashboard then loads.
//!
//! Every workflow takes the calling session's user explicitly; the service
//! itself holds no sign-in state.  Operators named in the console config are
//! written to `admins` at startup by [`AdminService::seed_operators`].

use chrono::{DateTime, Utc};
use robo_core::{MacAddress, MacAddressError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::ports::{AuthUser, BackendClient, BackendError, Direction, Document, Query};
use super::records::{collections, timestamp_value, UserProfile};

/// Errors returned by operator workflows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("sign in to use operator tools")]
    NotSignedIn,

    #[error("user {0} is not an operator")]
    NotOperator(String),

    #[error("enter a MAC address")]
    MissingMacAddress,

    #[error("select a user")]
    MissingUser,

    #[error(transparent)]
    InvalidMacAddress(#[from] MacAddressError),

    #[error("failed to register MAC address: {0}")]
    Backend(#[from] BackendError),
}

/// Result of a successful MAC registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacRegistration {
    /// Id of the new `macAddresses` document.
    pub registration_id: String,
    /// Id of the new `tablets` document.
    pub tablet_id: String,
    pub user_id: String,
    pub mac_address: MacAddress,
    pub registered_at: DateTime<Utc>,
    pub registered_by: String,
}

/// Operator checks, user listing and MAC registration.
#[derive(Clone)]
pub struct AdminService {
    backend: BackendClient,
}

impl AdminService {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// `true` when some `admins` document has `email` equal to the user's.
    ///
    /// Users without an email and failed lookups are never operators.
    pub async fn is_operator(&self, user: &AuthUser) -> bool {
        let Some(email) = user.email.as_deref() else {
            return false;
        };
        let query = Query::collection(collections::ADMINS).where_eq("email", email);
        match self.backend.store().query(&query).await {
            Ok(docs) => !docs.is_empty(),
            Err(e) => {
                warn!("operator check failed for {email}: {e}");
                false
            }
        }
    }

    /// Adds an `admins` document for each email that has none yet.
    ///
    /// Emails are trimmed and matched as written; blank entries are skipped.
    /// Returns how many documents were added.
    ///
    /// # Errors
    ///
    /// Propagates the first document store failure.
    pub async fn seed_operators(&self, emails: &[String]) -> Result<usize, BackendError> {
        let store = self.backend.store();
        let mut added = 0;
        for email in emails.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
            let query = Query::collection(collections::ADMINS).where_eq("email", email);
            if !store.query(&query).await?.is_empty() {
                debug!("operator {email} already present");
                continue;
            }
            let mut admin = Document::new();
            admin.insert("email".into(), Value::from(email));
            admin.insert("createdAt".into(), timestamp_value(Utc::now()));
            store.add(collections::ADMINS, admin).await?;
            info!("seeded operator {email}");
            added += 1;
        }
        Ok(added)
    }

    /// `caller`, provided they are signed in and an operator.
    async fn require_operator<'a>(
        &self,
        caller: Option<&'a AuthUser>,
    ) -> Result<&'a AuthUser, AdminError> {
        let user = caller.ok_or(AdminError::NotSignedIn)?;
        if !self.is_operator(user).await {
            return Err(AdminError::NotOperator(user.uid.clone()));
        }
        Ok(user)
    }

    /// Every user profile, newest account first.
    ///
    /// When the collection is empty the caller's own profile is listed alone.
    /// Store errors are logged and produce an empty list.
    ///
    /// # Errors
    ///
    /// [`AdminError::NotSignedIn`] or [`AdminError::NotOperator`].
    pub async fn list_users(&self, caller: Option<&AuthUser>) -> Result<Vec<UserProfile>, AdminError> {
        let operator = self.require_operator(caller).await?;

        let query = Query::collection(collections::USERS).order_by("createdAt", Direction::Descending);
        match self.backend.store().query(&query).await {
            Ok(docs) if docs.is_empty() => Ok(vec![UserProfile::from_auth_user(operator)]),
            Ok(docs) => Ok(docs.iter().map(UserProfile::from_document).collect()),
            Err(e) => {
                warn!("failed to list users: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Registers `raw_mac` as a tablet belonging to `user_id`.
    ///
    /// Appends one `macAddresses` document and one `tablets` document.
    ///
    /// # Errors
    ///
    /// - [`AdminError::MissingMacAddress`] / [`AdminError::MissingUser`] for
    ///   blank input.
    /// - [`AdminError::InvalidMacAddress`] when the address is malformed.
    /// - [`AdminError::Backend`] when a write fails.
    /// - [`AdminError::NotSignedIn`] / [`AdminError::NotOperator`].
    pub async fn register_mac_address(
        &self,
        caller: Option<&AuthUser>,
        raw_mac: &str,
        user_id: &str,
    ) -> Result<MacRegistration, AdminError> {
        if raw_mac.trim().is_empty() {
            return Err(AdminError::MissingMacAddress);
        }
        if user_id.trim().is_empty() {
            return Err(AdminError::MissingUser);
        }
        let operator = self.require_operator(caller).await?;
        let mac: MacAddress = raw_mac.parse()?;
        let now = Utc::now();

        let mut registration = Document::new();
        registration.insert("userId".into(), Value::from(user_id));
        registration.insert("macAddress".into(), Value::from(mac.to_string()));
        registration.insert("registeredAt".into(), timestamp_value(now));
        registration.insert("registeredBy".into(), Value::from(operator.uid.as_str()));
        let registration_id = self
            .backend
            .store()
            .add(collections::MAC_ADDRESSES, registration)
            .await?;

        let mut tablet = Document::new();
        tablet.insert("userId".into(), Value::from(user_id));
        tablet.insert("macAddress".into(), Value::from(mac.to_string()));
        tablet.insert("createdAt".into(), timestamp_value(now));
        let tablet_id = self.backend.store().add(collections::TABLETS, tablet).await?;

        info!("operator {} registered {mac} for user {user_id}", operator.uid);
        Ok(MacRegistration {
            registration_id,
            tablet_id,
            user_id: user_id.to_string(),
            mac_address: mac,
            registered_at: now,
            registered_by: operator.uid.clone(),
        })
    }
}
