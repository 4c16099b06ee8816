//! TabletDirectory: the tablet list shown on the dashboard.
//!
//! # Loading sequence
//!
//! ```text
//! load_for(user)
//!   ├─ publish placeholder tablets     (instant first paint)
//!   └─ query tablets where userId == uid
//!         ├─ non-empty → publish the query result
//!         ├─ empty     → keep the placeholders
//!         └─ error     → log, keep the placeholders
//! ```
//!
//! Each user session owns its own directory.  Subscribers receive every
//! published list through a `watch` channel.

use std::sync::Arc;

use async_trait::async_trait;
use robo_core::{FleetSummary, Tablet};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::ports::{AuthUser, DocumentStore, Query, StatusRefresher};
use super::records::{collections, tablet_from_document};

/// Loads and publishes the signed-in user's tablets.
pub struct TabletDirectory {
    store: Arc<dyn DocumentStore>,
    placeholders: Vec<Tablet>,
    tablets: watch::Sender<Vec<Tablet>>,
    /// Uid of the last loaded user; reload re-runs the load for it.
    last_uid: Mutex<Option<String>>,
}

impl TabletDirectory {
    /// Creates a directory that starts out with an empty list.
    pub fn new(store: Arc<dyn DocumentStore>, placeholders: Vec<Tablet>) -> Self {
        let (tablets, _) = watch::channel(Vec::new());
        Self {
            store,
            placeholders,
            tablets,
            last_uid: Mutex::new(None),
        }
    }

    /// Loads the tablets for `user`.  Does nothing when nobody is signed in.
    pub async fn load_for(&self, user: Option<&AuthUser>) {
        let Some(user) = user else {
            debug!("tablet load skipped: no signed-in user");
            return;
        };
        *self.last_uid.lock().await = Some(user.uid.clone());
        self.load_uid(&user.uid).await;
    }

    /// Re-runs the last load.  Does nothing if no user was ever loaded.
    pub async fn reload(&self) {
        let uid = self.last_uid.lock().await.clone();
        match uid {
            Some(uid) => self.load_uid(&uid).await,
            None => debug!("tablet reload skipped: no user loaded yet"),
        }
    }

    /// Forgets the loaded user and publishes an empty list.
    pub async fn clear(&self) {
        if let Some(uid) = self.last_uid.lock().await.take() {
            debug!("tablet list cleared for user {uid}");
        }
        self.tablets.send_replace(Vec::new());
    }

    async fn load_uid(&self, uid: &str) {
        self.tablets.send_replace(self.placeholders.clone());

        let query = Query::collection(collections::TABLETS).where_eq("userId", uid);
        match self.store.query(&query).await {
            Ok(docs) if !docs.is_empty() => {
                let tablets: Vec<Tablet> = docs.iter().map(tablet_from_document).collect();
                info!("loaded {} tablets for user {uid}", tablets.len());
                self.tablets.send_replace(tablets);
            }
            Ok(_) => debug!("no tablets stored for user {uid}; showing placeholders"),
            Err(e) => warn!("failed to load tablets for user {uid}: {e}"),
        }
    }

    /// The current list.
    pub fn tablets(&self) -> Vec<Tablet> {
        self.tablets.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Tablet>> {
        self.tablets.subscribe()
    }

    pub fn find(&self, tablet_id: &str) -> Option<Tablet> {
        self.tablets.borrow().iter().find(|t| t.id == tablet_id).cloned()
    }

    /// Stat-card numbers for the current list.
    pub fn summary(&self) -> FleetSummary {
        FleetSummary::from_tablets(&self.tablets.borrow())
    }
}

#[async_trait]
impl StatusRefresher for TabletDirectory {
    async fn refresh(&self) {
        self.reload().await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
