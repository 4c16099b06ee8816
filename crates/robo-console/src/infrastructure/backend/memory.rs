//! In-memory identity provider and document store.
//!
//! Used when no hosted backend is configured, and by tests.  Both services
//! can be switched into an "unavailable" mode so callers can exercise their
//! error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::ports::{
    AuthUser, BackendError, Document, DocumentSnapshot, DocumentStore, IdentityProvider, Query,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Document store ────────────────────────────────────────────────────────────

/// Collections of documents kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<DocumentSnapshot>>>,
    unavailable: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`BackendError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Inserts or replaces a document with a known id.
    pub fn insert(&self, collection: &str, id: &str, data: Document) {
        let mut collections = lock(&self.collections);
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.data = data,
            None => docs.push(DocumentSnapshot {
                id: id.to_string(),
                data,
            }),
        }
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        lock(&self.collections).get(collection).map_or(0, Vec::len)
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(BackendError::Unavailable("document store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>, BackendError> {
        self.check_available()?;
        let collections = lock(&self.collections);
        let mut matches: Vec<DocumentSnapshot> = collections
            .get(&query.collection)
            .map(|docs| docs.iter().filter(|d| query.matches(&d.data)).cloned().collect())
            .unwrap_or_default();
        matches.sort_by(|a, b| query.compare(&a.data, &b.data));
        Ok(matches)
    }

    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<DocumentSnapshot>, BackendError> {
        self.check_available()?;
        Ok(lock(&self.collections)
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn add(&self, collection: &str, data: Document) -> Result<String, BackendError> {
        self.check_available()?;
        let id = Uuid::new_v4().simple().to_string();
        lock(&self.collections)
            .entry(collection.to_string())
            .or_default()
            .push(DocumentSnapshot {
                id: id.clone(),
                data,
            });
        debug!("added {collection}/{id}");
        Ok(id)
    }

    async fn set_merge(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<(), BackendError> {
        self.check_available()?;
        let mut collections = lock(&self.collections);
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.data.extend(data),
            None => docs.push(DocumentSnapshot {
                id: id.to_string(),
                data,
            }),
        }
        Ok(())
    }
}

// ── Identity provider ─────────────────────────────────────────────────────────

/// Accepts any non-blank email.
///
/// The first sign-in with an email creates an account with a generated uid;
/// later sign-ins return the same account.  Accounts can also be seeded with
/// [`InMemoryIdentityProvider::register_account`].
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, AuthUser>>,
    unavailable: AtomicBool,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an account keyed by its email.
    ///
    /// Accounts without an email cannot sign in and are ignored.
    pub fn register_account(&self, user: AuthUser) {
        if let Some(email) = user.email.clone() {
            lock(&self.accounts).insert(email.to_lowercase(), user);
        }
    }

    /// Makes sign-in fail with [`BackendError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in(&self, email: &str) -> Result<AuthUser, BackendError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(BackendError::Unavailable("identity provider offline".to_string()));
        }
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(BackendError::SignInRejected(email.to_string()));
        }

        let user = lock(&self.accounts)
            .entry(email.to_lowercase())
            .or_insert_with(|| AuthUser {
                uid: Uuid::new_v4().simple().to_string(),
                email: Some(email.to_string()),
                display_name: None,
                photo_url: None,
            })
            .clone();
        info!("signed in {} as {}", email, user.uid);
        Ok(user)
    }

    async fn sign_out(&self, user: &AuthUser) -> Result<(), BackendError> {
        info!("signed out {}", user.uid);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
