//! BridgeSession: the console as seen by one browser tab.
//!
//! Each WebSocket connection owns one [`BridgeSession`].  The session turns
//! every [`BrowserRequest`] into a call on the console's command bridge and
//! wraps the result in a [`ServerMsg::Reply`].
//!
//! Every session has its own [`UserSession`]: signing in or out in one
//! browser tab never changes who is signed in on another.  Only the backend,
//! the control lock and the control history are shared.
//!
//! # Control dialogs
//!
//! A session has at most one open control dialog.  While it is open a
//! forwarder task copies every dialog snapshot into the session's outbound
//! queue as a [`ServerMsg::ControlUpdate`].  Opening another dialog, sending
//! `CloseControl`, or ending the session closes the dialog, which cancels
//! whatever transition it still had pending.
//!
//! ```text
//! OpenControl ─► ControlDialog ── watch ──► forwarder ──► outbound queue
//!                     ▲
//! ExecuteControl ─────┘
//! ```

use std::sync::Arc;

use robo_console::application::control_device::{ControlDialog, ControlSnapshot};
use robo_console::application::session::UserSession;
use robo_console::infrastructure::ui_bridge::{self, AppState, CommandResult, OpenControlError};
use robo_core::{ControlAction, ControlError};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::messages::{BrowserRequest, ServerMsg};

// ── Error type ────────────────────────────────────────────────────────────────

/// Failures while handling a browser frame.
///
/// None of these end the session; they are reported back to the browser.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The frame was not a valid [`BrowserRequest`].
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    /// `ExecuteControl` arrived with no dialog open.
    #[error("no control dialog is open")]
    NoDialog,

    #[error(transparent)]
    OpenControl(#[from] OpenControlError),

    #[error(transparent)]
    Control(#[from] ControlError),
}

/// Parses one text frame.
///
/// # Errors
///
/// [`BridgeError::InvalidRequest`] when the JSON is malformed or names an
/// unknown request type.
pub fn parse_request(text: &str) -> Result<BrowserRequest, BridgeError> {
    Ok(serde_json::from_str(text)?)
}

/// Converts a console command result into a reply.
pub fn reply<T: Serialize>(request: &str, result: CommandResult<T>) -> ServerMsg {
    match (result.success, result.data) {
        (true, Some(data)) => match serde_json::to_value(data) {
            Ok(value) => ServerMsg::reply_ok(request, value),
            Err(e) => ServerMsg::reply_err(request, format!("failed to encode reply: {e}")),
        },
        _ => ServerMsg::reply_err(
            request,
            result.error.unwrap_or_else(|| "command failed".to_string()),
        ),
    }
}

fn outcome_reply<T: Serialize>(request: &str, result: Result<T, BridgeError>) -> ServerMsg {
    match result {
        Ok(data) => reply(request, CommandResult::ok(data)),
        Err(e) => ServerMsg::reply_err(request, e.to_string()),
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

struct OpenDialog {
    dialog: ControlDialog,
    forwarder: JoinHandle<()>,
}

/// Per-connection state.
pub struct BridgeSession {
    state: Arc<AppState>,
    user: UserSession,
    outbound: mpsc::Sender<ServerMsg>,
    dialog: Option<OpenDialog>,
}

impl BridgeSession {
    /// A signed-out session.  `outbound` receives the dialog updates pushed
    /// between replies.
    pub fn new(state: Arc<AppState>, outbound: mpsc::Sender<ServerMsg>) -> Self {
        Self {
            user: state.new_session(),
            state,
            outbound,
            dialog: None,
        }
    }

    /// `true` while a control dialog is open in this session.
    pub fn has_dialog(&self) -> bool {
        self.dialog.is_some()
    }

    /// Handles one request.
    pub async fn handle(&mut self, request: BrowserRequest) -> ServerMsg {
        let name = request.name();
        let shared = Arc::clone(&self.state);
        let state: &AppState = &shared;
        match request {
            BrowserRequest::SignIn { email } => {
                reply(name, ui_bridge::sign_in(state, &mut self.user, &email).await)
            }
            BrowserRequest::SignOut => {
                self.close_dialog().await;
                reply(name, ui_bridge::sign_out(&mut self.user).await)
            }
            BrowserRequest::CurrentUser => {
                reply(name, ui_bridge::current_user(state, &self.user).await)
            }
            BrowserRequest::ListTablets => reply(name, ui_bridge::list_tablets(&self.user).await),
            BrowserRequest::ReloadTablets => {
                reply(name, ui_bridge::reload_tablets(&self.user).await)
            }
            BrowserRequest::SearchStores { query } => {
                reply(name, ui_bridge::search_stores(state, &self.user, &query).await)
            }
            BrowserRequest::StoreTablets { store_id } => {
                reply(name, ui_bridge::store_tablets(&self.user, &store_id).await)
            }
            BrowserRequest::FleetDistribution => {
                reply(name, ui_bridge::fleet_distribution(&self.user).await)
            }
            BrowserRequest::GenerateWifiQr { credentials } => {
                reply(name, ui_bridge::generate_wifi_qr(credentials).await)
            }
            BrowserRequest::ListUsers => {
                reply(name, ui_bridge::list_users(state, &self.user).await)
            }
            BrowserRequest::RegisterMacAddress {
                mac_address,
                user_id,
            } => reply(
                name,
                ui_bridge::register_mac_address(state, &self.user, &mac_address, &user_id).await,
            ),
            BrowserRequest::ControlHistory { limit } => {
                reply(name, ui_bridge::control_history(state, limit).await)
            }
            BrowserRequest::OpenControl { tablet_id } => {
                outcome_reply(name, self.open_control(&tablet_id).await)
            }
            BrowserRequest::ExecuteControl { action } => {
                outcome_reply(name, self.execute(action).await)
            }
            BrowserRequest::CloseControl => {
                self.close_dialog().await;
                ServerMsg::reply_ok(name, serde_json::Value::Null)
            }
        }
    }

    /// Opens a dialog for `tablet_id` and starts forwarding its updates.
    async fn open_control(
        &mut self,
        tablet_id: &str,
    ) -> Result<ControlSnapshot, BridgeError> {
        self.close_dialog().await;
        let dialog = ui_bridge::open_control(&self.state, &self.user, tablet_id)?;
        let snapshot = dialog.snapshot();

        // Ends by itself once the dialog and its running action are gone.
        let mut updates = dialog.subscribe();
        let outbound = self.outbound.clone();
        let forwarder = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                if outbound.send(ServerMsg::ControlUpdate { snapshot }).await.is_err() {
                    break;
                }
            }
        });

        self.dialog = Some(OpenDialog { dialog, forwarder });
        Ok(snapshot)
    }

    async fn execute(
        &mut self,
        action: ControlAction,
    ) -> Result<ControlSnapshot, BridgeError> {
        let open = self.dialog.as_ref().ok_or(BridgeError::NoDialog)?;
        // The action runs on its own task; its progress reaches the browser
        // through the forwarder.
        let _pending = open.dialog.execute(action).await?;
        Ok(open.dialog.snapshot())
    }

    /// Closes the open dialog, if any.
    pub async fn close_dialog(&mut self) {
        if let Some(open) = self.dialog.take() {
            open.dialog.close().await;
            debug!("control dialog for {} closed", open.dialog.tablet().id);
        }
    }

    /// Ends the session.  Any open dialog is closed.
    pub async fn end(mut self) {
        self.close_dialog().await;
    }
}

impl Drop for BridgeSession {
    fn drop(&mut self) {
        if let Some(open) = self.dialog.take() {
            warn!(
                "session dropped with dialog for {} still open; cancelling",
                open.dialog.tablet().id
            );
            open.forwarder.abort();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
