//! UserSession: one surface's signed-in user and their tablet list.
//!
//! Every CLI invocation and every browser connection owns its own session.
//! Sessions share the backend, but a sign-in or sign-out in one never shows
//! up in another.
//!
//! ```text
//! sign_in(email)
//!   ├─ IdentityProvider::sign_in
//!   ├─ sync_user_profile        (failures logged)
//!   └─ TabletDirectory::load_for
//!
//! sign_out()
//!   ├─ IdentityProvider::sign_out
//!   └─ TabletDirectory::clear
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::manage_tablets::TabletDirectory;
use super::ports::{AuthUser, BackendClient, BackendError};
use super::user_sync::sync_user_profile;

/// Sign-in state and tablets of one client.
pub struct UserSession {
    backend: BackendClient,
    user: Option<AuthUser>,
    directory: Arc<TabletDirectory>,
}

impl UserSession {
    /// A signed-out session that loads tablets into `directory`.
    pub fn new(backend: BackendClient, directory: TabletDirectory) -> Self {
        Self {
            backend,
            user: None,
            directory: Arc::new(directory),
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn directory(&self) -> &Arc<TabletDirectory> {
        &self.directory
    }

    /// Name recorded against this session's control actions: the email, or
    /// the uid for accounts without one.
    pub fn actor(&self) -> Option<String> {
        self.user
            .as_ref()
            .map(|u| u.email.clone().unwrap_or_else(|| u.uid.clone()))
    }

    /// Signs in, syncs the profile and loads the user's tablets.
    ///
    /// Signing in while already signed in switches the session to the new
    /// account.
    ///
    /// # Errors
    ///
    /// Propagates the identity provider's rejection; the session is left as
    /// it was.
    pub async fn sign_in(&mut self, email: &str) -> Result<AuthUser, BackendError> {
        let user = self.backend.identity().sign_in(email).await?;
        if let Err(e) = sync_user_profile(self.backend.store().as_ref(), &user, Utc::now()).await {
            warn!("failed to sync profile for user {}: {e}", user.uid);
        }
        self.directory.load_for(Some(&user)).await;
        self.user = Some(user.clone());
        Ok(user)
    }

    /// Signs out and empties the tablet list.  Signed-out sessions only
    /// clear the list.
    ///
    /// # Errors
    ///
    /// Propagates the identity provider's failure; the user stays signed in.
    pub async fn sign_out(&mut self) -> Result<(), BackendError> {
        if let Some(user) = self.user.as_ref() {
            self.backend.identity().sign_out(user).await?;
            info!("session for user {} signed out", user.uid);
        }
        self.user = None;
        self.directory.clear().await;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::DocumentStore;
    use crate::infrastructure::backend::memory::{InMemoryDocumentStore, InMemoryIdentityProvider};
    use crate::infrastructure::backend::placeholder::placeholder_tablets;
    use serde_json::json;

    struct Fixture {
        store: Arc<InMemoryDocumentStore>,
        identity: Arc<InMemoryIdentityProvider>,
        backend: BackendClient,
    }

    fn fixture() -> Fixture {
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let store = Arc::new(InMemoryDocumentStore::new());
        let backend = BackendClient::new(identity.clone(), store.clone());
        Fixture {
            store,
            identity,
            backend,
        }
    }

    fn session(f: &Fixture) -> UserSession {
        let directory = TabletDirectory::new(f.backend.store().clone(), placeholder_tablets());
        UserSession::new(f.backend.clone(), directory)
    }

    fn account(uid: &str, email: Option<&str>) -> AuthUser {
        AuthUser {
            uid: uid.to_string(),
            email: email.map(str::to_string),
            display_name: None,
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_sign_in_loads_tablets_and_creates_profile() {
        // Arrange
        let f = fixture();
        let mut s = session(&f);

        // Act
        let user = s.sign_in("owner@example.com").await.unwrap();

        // Assert
        assert_eq!(s.user(), Some(&user));
        assert_eq!(s.directory().tablets().len(), 3);
        let profile = f.store.get("users", &user.uid).await.unwrap().unwrap();
        assert!(profile.data.contains_key("createdAt"));
        assert!(profile.data.contains_key("lastLoginAt"));
    }

    #[tokio::test]
    async fn test_sign_in_keeps_existing_created_at() {
        // Arrange: the profile already exists from an earlier login
        let f = fixture();
        f.identity.register_account(account("owner-1", Some("owner@example.com")));
        let Some(existing) = json!({"createdAt": "2024-01-01T00:00:00.000Z"}).as_object().cloned()
        else {
            unreachable!()
        };
        f.store.insert("users", "owner-1", existing);
        let mut s = session(&f);

        // Act
        s.sign_in("owner@example.com").await.unwrap();

        // Assert
        let profile = f.store.get("users", "owner-1").await.unwrap().unwrap();
        assert_eq!(profile.data["createdAt"], "2024-01-01T00:00:00.000Z");
        assert_eq!(f.store.count("users"), 1);
    }

    #[tokio::test]
    async fn test_rejected_sign_in_leaves_session_signed_out() {
        let f = fixture();
        let mut s = session(&f);

        assert!(s.sign_in("not-an-email").await.is_err());

        assert!(s.user().is_none());
        assert!(s.directory().tablets().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_clears_user_and_tablets() {
        // Arrange
        let f = fixture();
        let mut s = session(&f);
        s.sign_in("owner@example.com").await.unwrap();

        // Act
        s.sign_out().await.unwrap();

        // Assert
        assert!(s.user().is_none());
        assert!(s.actor().is_none());
        assert!(s.directory().tablets().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_sign_in() {
        // Arrange
        let f = fixture();
        let mut first = session(&f);
        let mut second = session(&f);
        first.sign_in("owner@example.com").await.unwrap();

        // Act
        second.sign_out().await.unwrap();

        // Assert
        assert!(second.user().is_none());
        assert!(second.directory().tablets().is_empty());
        assert_eq!(first.actor().as_deref(), Some("owner@example.com"));
        assert_eq!(first.directory().tablets().len(), 3);
    }

    #[tokio::test]
    async fn test_actor_falls_back_to_uid() {
        let f = fixture();
        let mut s = session(&f);
        s.user = Some(account("u-9", None));
        assert_eq!(s.actor().as_deref(), Some("u-9"));
    }
}
