//! JSON message types for the browser-facing WebSocket protocol.
//!
//! # Message flow
//!
//! ```text
//! Browser → Bridge:  JSON text frame  →  BrowserRequest
//! Bridge  → Browser: ServerMsg        →  JSON text frame
//! ```
//!
//! Every request gets exactly one `Reply`.  While a control dialog is open
//! the bridge also pushes a `ControlUpdate` for every change to it, so the
//! browser sees the status go in-progress, resolve and settle without
//! polling.
//!
//! # JSON discriminant
//!
//! Every message is a JSON object with a `"type"` field naming the variant;
//! the other fields sit in the same object, in camelCase:
//!
//! ```json
//! {"type":"OpenControl","tabletId":"dummy1"}
//! {"type":"ExecuteControl","action":"restart"}
//! ```

use robo_console::application::control_device::ControlSnapshot;
use robo_core::{ControlAction, WifiCredentials};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Browser → Bridge ──────────────────────────────────────────────────────────

/// Everything the dashboard can ask the bridge to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum BrowserRequest {
    /// Signs in and loads the user's tablets.
    SignIn { email: String },

    SignOut,

    /// The signed-in user, or `null`.
    CurrentUser,

    /// Tablet table plus stat cards.
    ListTablets,

    /// Re-runs the tablet query, then replies like `ListTablets`.
    ReloadTablets,

    /// Stores whose name or location contains `query`.
    SearchStores {
        #[serde(default)]
        query: String,
    },

    /// Loaded tablets that belong to one store.
    StoreTablets { store_id: String },

    /// Version and firmware breakdown.
    FleetDistribution,

    /// Encodes a WiFi QR payload.
    GenerateWifiQr { credentials: WifiCredentials },

    /// Operator only.
    ListUsers,

    /// Operator only.
    RegisterMacAddress { mac_address: String, user_id: String },

    /// Most recent control actions, newest first.
    ControlHistory {
        #[serde(default = "default_history_limit")]
        limit: usize,
    },

    /// Opens the control dialog for a tablet, closing any dialog this
    /// session already had open.
    OpenControl { tablet_id: String },

    /// Runs an action in the open dialog.
    ExecuteControl { action: ControlAction },

    /// Closes the open dialog, discarding any pending transition.
    CloseControl,
}

fn default_history_limit() -> usize {
    20
}

impl BrowserRequest {
    /// The variant name, used in replies and log lines.
    ///
    /// Never includes field values, so passwords and emails stay out of logs.
    pub fn name(&self) -> &'static str {
        match self {
            BrowserRequest::SignIn { .. } => "SignIn",
            BrowserRequest::SignOut => "SignOut",
            BrowserRequest::CurrentUser => "CurrentUser",
            BrowserRequest::ListTablets => "ListTablets",
            BrowserRequest::ReloadTablets => "ReloadTablets",
            BrowserRequest::SearchStores { .. } => "SearchStores",
            BrowserRequest::StoreTablets { .. } => "StoreTablets",
            BrowserRequest::FleetDistribution => "FleetDistribution",
            BrowserRequest::GenerateWifiQr { .. } => "GenerateWifiQr",
            BrowserRequest::ListUsers => "ListUsers",
            BrowserRequest::RegisterMacAddress { .. } => "RegisterMacAddress",
            BrowserRequest::ControlHistory { .. } => "ControlHistory",
            BrowserRequest::OpenControl { .. } => "OpenControl",
            BrowserRequest::ExecuteControl { .. } => "ExecuteControl",
            BrowserRequest::CloseControl => "CloseControl",
        }
    }
}

// ── Bridge → Browser ──────────────────────────────────────────────────────────

/// Everything the bridge sends to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerMsg {
    /// The answer to one request, in the console's command result shape.
    Reply {
        /// [`BrowserRequest::name`] of the request being answered.
        request: String,
        success: bool,
        data: Option<Value>,
        error: Option<String>,
    },

    /// The open control dialog changed.
    ControlUpdate { snapshot: ControlSnapshot },

    /// A frame that could not be understood.
    Error { message: String },
}

impl ServerMsg {
    pub fn reply_ok(request: &str, data: Value) -> Self {
        ServerMsg::Reply {
            request: request.to_string(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn reply_err(request: &str, error: impl Into<String>) -> Self {
        ServerMsg::Reply {
            request: request.to_string(),
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
