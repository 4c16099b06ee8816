//! Mapping between store documents and console records.
//!
//! Documents written by older dashboard versions are often missing fields,
//! so every read falls back to a display default instead of failing.

use chrono::{DateTime, SecondsFormat, Utc};
use robo_core::Tablet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ports::{AuthUser, Document, DocumentSnapshot};

/// Collection names used by the console.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TABLETS: &str = "tablets";
    pub const ADMINS: &str = "admins";
    pub const MAC_ADDRESSES: &str = "macAddresses";
}

/// Shown for a missing or empty text field.
pub const MISSING_TEXT: &str = "N/A";

/// Encodes a timestamp the way documents store it (RFC 3339, UTC, millis).
///
/// Strings in this format sort chronologically, which is what
/// `order_by("createdAt")` relies on.
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Non-empty text field or [`MISSING_TEXT`].
fn text_or_missing(snapshot: &DocumentSnapshot, field: &str) -> String {
    match snapshot.str_field(field) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => MISSING_TEXT.to_string(),
    }
}

/// Builds a [`Tablet`] from a `tablets` document.
pub fn tablet_from_document(snapshot: &DocumentSnapshot) -> Tablet {
    Tablet {
        id: snapshot.id.clone(),
        mac_address: snapshot.str_field("macAddress").unwrap_or_default().to_string(),
        table_number: text_or_missing(snapshot, "tableNumber"),
        wifi_strength: text_or_missing(snapshot, "wifiStrength"),
        battery_level: text_or_missing(snapshot, "batteryLevel"),
        version: text_or_missing(snapshot, "version"),
        ip_address: text_or_missing(snapshot, "ipAddress"),
        firmware_build: text_or_missing(snapshot, "firmwareBuild"),
        is_on: snapshot.bool_field("isOn").unwrap_or(false),
        store_id: snapshot
            .str_field("storeId")
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}

/// A row of the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn from_document(snapshot: &DocumentSnapshot) -> Self {
        let text = |field: &str| snapshot.str_field(field).map(str::to_string);
        Self {
            uid: snapshot.id.clone(),
            email: text("email"),
            display_name: text("displayName"),
            photo_url: text("photoURL"),
            created_at: parse_timestamp(snapshot.str_field("createdAt")),
            last_login_at: parse_timestamp(snapshot.str_field("lastLoginAt")),
        }
    }

    /// Profile for a signed-in user that has no `users` document yet.
    pub fn from_auth_user(user: &AuthUser) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            created_at: None,
            last_login_at: None,
        }
    }

    /// Name to show in user pickers: display name, else email, else uid.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Profile fields merged into `users/<uid>` on every sign-in.
///
/// Absent optional fields are written as `null`.
pub fn profile_update(user: &AuthUser, now: DateTime<Utc>) -> Document {
    let optional = |v: &Option<String>| v.clone().map(Value::String).unwrap_or(Value::Null);
    let mut doc = Document::new();
    doc.insert("email".into(), optional(&user.email));
    doc.insert("displayName".into(), optional(&user.display_name));
    doc.insert("photoURL".into(), optional(&user.photo_url));
    doc.insert("lastLoginAt".into(), timestamp_value(now));
    doc
}

// ── Tests ─────────────────────────────────────────────────────────────────────
