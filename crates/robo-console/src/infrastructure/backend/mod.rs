//! Backend connection: configuration and client construction.
//!
//! The console talks to two hosted services, an identity provider and a
//! document store.  Their settings come from `ROBO_BACKEND_*` environment
//! variables:
//!
//! | Variable                           | Field                 |
//! |------------------------------------|-----------------------|
//! | `ROBO_BACKEND_API_KEY`             | `api_key`             |
//! | `ROBO_BACKEND_AUTH_DOMAIN`         | `auth_domain`         |
//! | `ROBO_BACKEND_PROJECT_ID`          | `project_id`          |
//! | `ROBO_BACKEND_STORAGE_BUCKET`      | `storage_bucket`      |
//! | `ROBO_BACKEND_MESSAGING_SENDER_ID` | `messaging_sender_id` |
//! | `ROBO_BACKEND_APP_ID`              | `app_id`              |
//!
//! [`connect`] is called exactly once at startup and the resulting
//! [`BackendClient`] is passed to every use case that needs it.  Only the
//! in-memory backend ships with this crate; a hosted driver would slot in
//! here behind the same traits.

pub mod memory;
pub mod placeholder;

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::ports::BackendClient;
use memory::{InMemoryDocumentStore, InMemoryIdentityProvider};

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

impl BackendConfig {
    /// Reads the `ROBO_BACKEND_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            api_key: get("ROBO_BACKEND_API_KEY"),
            auth_domain: get("ROBO_BACKEND_AUTH_DOMAIN"),
            project_id: get("ROBO_BACKEND_PROJECT_ID"),
            storage_bucket: get("ROBO_BACKEND_STORAGE_BUCKET"),
            messaging_sender_id: get("ROBO_BACKEND_MESSAGING_SENDER_ID"),
            app_id: get("ROBO_BACKEND_APP_ID"),
        }
    }

    /// `true` when an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Builds the backend client.
///
/// A missing API key is reported with a warning; the console then runs
/// against the in-memory backend instead of failing to start.
pub fn connect(config: &BackendConfig) -> BackendClient {
    if config.is_configured() {
        info!(
            "backend project {} configured; using the in-memory document store",
            config.project_id.as_deref().unwrap_or("<unnamed>")
        );
    } else {
        warn!("backend API key missing (set ROBO_BACKEND_API_KEY); using the in-memory backend");
    }
    in_memory_client()
}

/// A client backed by fresh in-memory services.
pub fn in_memory_client() -> BackendClient {
    BackendClient::new(
        Arc::new(InMemoryIdentityProvider::new()),
        Arc::new(InMemoryDocumentStore::new()),
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
