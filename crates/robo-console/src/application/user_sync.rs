//! Mirrors the signed-in user's profile into the `users` collection.
//!
//! Each successful sign-in merges the profile fields and the login time into
//! `users/<uid>`.  `createdAt` is written only the first time, when the
//! document does not exist yet.  Failures are logged by the caller and
//! otherwise ignored; the dashboard keeps working without the mirror.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::ports::{AuthUser, BackendError, DocumentStore};
use super::records::{collections, profile_update, timestamp_value};

/// Writes `user`'s profile into `users/<uid>` as of `now`.
///
/// # Errors
///
/// Propagates document store failures; callers normally log and drop them.
pub async fn sync_user_profile(
    store: &dyn DocumentStore,
    user: &AuthUser,
    now: DateTime<Utc>,
) -> Result<(), BackendError> {
    let existing = store.get(collections::USERS, &user.uid).await?;

    let mut update = profile_update(user, now);
    if existing.is_none() {
        update.insert("createdAt".into(), timestamp_value(now));
        info!("creating profile for user {}", user.uid);
    }
    store.set_merge(collections::USERS, &user.uid, update).await?;
    debug!("profile synced for user {}", user.uid);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
