//! Command bridge: exposes application-layer operations to the surfaces.
//!
//! The CLI and the WebSocket bridge both drive the console through the
//! functions in this module.  Each takes the shared [`AppState`], the
//! caller's own [`UserSession`], or both, and returns a serialisable result.
//! Only the backend, the control lock and the control history are shared
//! between sessions.
//!
//! # Data Transfer Objects (DTOs)
//!
//! DTOs are flat structs that contain only JSON-friendly fields.  They are
//! what the browser dashboard receives, so field names are camelCase to
//! match its JavaScript.
//!
//! # `CommandResult<T>` wrapper
//!
//! Every command returns `CommandResult<T>` rather than `Result<T, E>`, so
//! every response has the same shape:
//! `{ success: bool, data: T | null, error: string | null }`.
//!
//! The one exception is [`open_control`]: a [`ControlDialog`] is a live
//! object, not data, so it comes back as a plain `Result`.

use std::sync::Arc;

use robo_core::{
    encode_wifi_payload, firmware_distribution, search_stores as filter_stores,
    tablets_in_store, version_distribution, DistributionEntry, FleetSummary, SignalLevel,
    Tablet, WifiCredentials,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::{
    admin::{AdminService, MacRegistration},
    control_device::{ControlDeviceUseCase, ControlDialog},
    control_history::ControlHistoryEntry,
    manage_tablets::TabletDirectory,
    ports::{AuthUser, BackendClient, DeviceLink, StatusRefresher, StoreCatalog},
    records::UserProfile,
    session::UserSession,
};
use crate::infrastructure::{
    backend::placeholder::{placeholder_tablets, PlaceholderStoreCatalog},
    device_link::SimulatedDeviceLink,
    storage::config::{AppConfig, ControlConfig},
};

// ── Shared application state ──────────────────────────────────────────────────

/// State shared by every session.
///
/// Built once at startup and handed around as `Arc<AppState>`.
pub struct AppState {
    /// Identity provider and document store.
    pub backend: BackendClient,
    /// The configuration the console was started with.
    pub config: AppConfig,
    /// Store listing.
    pub stores: Arc<dyn StoreCatalog>,
    /// Opens control dialogs; owns the control lock and history.
    pub control: ControlDeviceUseCase,
    /// Operator workflows.
    pub admin: AdminService,
    /// Shown while a session's tablets load and when the user has none.
    placeholders: Vec<Tablet>,
}

impl AppState {
    /// Builds the state and writes the configured operators to `admins`.
    ///
    /// A failed operator write is logged; the console still starts.
    pub async fn start(backend: BackendClient, config: AppConfig) -> Arc<Self> {
        let state = Self::new(backend, config);
        match state.admin.seed_operators(&state.config.console.operators).await {
            Ok(0) => {}
            Ok(added) => info!("{added} operator(s) added from config"),
            Err(e) => warn!("failed to seed operators: {e}"),
        }
        state
    }

    /// Wires the use cases around `backend` using the simulated device link.
    pub fn new(backend: BackendClient, config: AppConfig) -> Arc<Self> {
        let link = simulated_link(&config.control);
        Self::with_link(backend, config, link)
    }

    /// Same as [`AppState::new`] with an explicit device link.
    pub fn with_link(
        backend: BackendClient,
        config: AppConfig,
        link: Arc<dyn DeviceLink>,
    ) -> Arc<Self> {
        let placeholders = if config.fleet.show_placeholders {
            placeholder_tablets()
        } else {
            Vec::new()
        };
        let control = ControlDeviceUseCase::new(
            link,
            config.control.timings(),
            config.control.history_limit,
        );

        Arc::new(Self {
            admin: AdminService::new(backend.clone()),
            backend,
            config,
            stores: Arc::new(PlaceholderStoreCatalog),
            control,
            placeholders,
        })
    }

    /// A new signed-out session with an empty tablet list.
    pub fn new_session(&self) -> UserSession {
        let directory =
            TabletDirectory::new(Arc::clone(self.backend.store()), self.placeholders.clone());
        UserSession::new(self.backend.clone(), directory)
    }
}

fn simulated_link(control: &ControlConfig) -> Arc<dyn DeviceLink> {
    Arc::new(SimulatedDeviceLink::new(
        control.latency(),
        control.success_probability,
        control.seed,
    ))
}

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub is_operator: bool,
}

/// One tablet row with its derived display values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabletDto {
    #[serde(flatten)]
    pub tablet: Tablet,
    pub power_label: String,
    pub wifi_signal: SignalLevel,
    pub battery_signal: SignalLevel,
}

impl From<&Tablet> for TabletDto {
    fn from(t: &Tablet) -> Self {
        Self {
            tablet: t.clone(),
            power_label: t.power_label().to_string(),
            wifi_signal: t.wifi_signal(),
            battery_signal: t.battery_signal(),
        }
    }
}

/// The dashboard's tablet table plus its stat cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetDto {
    pub tablets: Vec<TabletDto>,
    pub summary: FleetSummary,
}

/// One store card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDto {
    pub id: String,
    pub name: String,
    pub location: String,
    /// Count reported by the catalog.
    pub tablet_count: u32,
    /// Loaded tablets carrying this store's id.
    pub loaded_tablets: usize,
}

/// Version and firmware breakdown of the loaded tablets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionDto {
    pub versions: Vec<DistributionEntry>,
    pub firmware: Vec<DistributionEntry>,
}

/// Encoded WiFi QR payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiQrDto {
    pub payload: String,
    pub file_name: String,
}

/// Unified response wrapper used by every command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Why a control dialog could not be opened.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpenControlError {
    #[error("no tablet with id {0}")]
    UnknownTablet(String),
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn user_dto(state: &AppState, user: &AuthUser) -> UserDto {
    let is_operator = state.admin.is_operator(user).await;
    UserDto {
        uid: user.uid.clone(),
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        photo_url: user.photo_url.clone(),
        is_operator,
    }
}

/// Signs `session` in, syncs the user's profile and loads their tablets.
pub async fn sign_in(
    state: &AppState,
    session: &mut UserSession,
    email: &str,
) -> CommandResult<UserDto> {
    match session.sign_in(email).await {
        Ok(user) => CommandResult::ok(user_dto(state, &user).await),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Signs `session` out and empties its tablet list.
pub async fn sign_out(session: &mut UserSession) -> CommandResult<()> {
    match session.sign_out().await {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// The user signed in on `session`, if any.
pub async fn current_user(state: &AppState, session: &UserSession) -> CommandResult<Option<UserDto>> {
    let dto = match session.user() {
        Some(user) => Some(user_dto(state, user).await),
        None => None,
    };
    CommandResult::ok(dto)
}

/// The tablet table and stat cards.
pub async fn list_tablets(session: &UserSession) -> CommandResult<FleetDto> {
    let tablets = session.directory().tablets();
    CommandResult::ok(FleetDto {
        summary: FleetSummary::from_tablets(&tablets),
        tablets: tablets.iter().map(TabletDto::from).collect(),
    })
}

/// Re-runs the tablet query for the signed-in user.
pub async fn reload_tablets(session: &UserSession) -> CommandResult<FleetDto> {
    session.directory().reload().await;
    list_tablets(session).await
}

/// Stores whose name or location contains `query` (all stores when blank).
pub async fn search_stores(
    state: &AppState,
    session: &UserSession,
    query: &str,
) -> CommandResult<Vec<StoreDto>> {
    let stores = match state.stores.list_stores().await {
        Ok(stores) => stores,
        Err(e) => return CommandResult::err(e.to_string()),
    };
    let tablets = session.directory().tablets();
    let dtos = filter_stores(&stores, query)
        .into_iter()
        .map(|s| StoreDto {
            id: s.id.clone(),
            name: s.name.clone(),
            location: s.location.clone(),
            tablet_count: s.tablet_count,
            loaded_tablets: tablets_in_store(&tablets, &s.id).len(),
        })
        .collect();
    CommandResult::ok(dtos)
}

/// Tablets belonging to `store_id`.
pub async fn store_tablets(session: &UserSession, store_id: &str) -> CommandResult<Vec<TabletDto>> {
    let tablets = session.directory().tablets();
    let dtos = tablets_in_store(&tablets, store_id)
        .into_iter()
        .map(TabletDto::from)
        .collect();
    CommandResult::ok(dtos)
}

pub async fn fleet_distribution(session: &UserSession) -> CommandResult<DistributionDto> {
    let tablets = session.directory().tablets();
    CommandResult::ok(DistributionDto {
        versions: version_distribution(&tablets),
        firmware: firmware_distribution(&tablets),
    })
}

/// Encodes the WiFi QR payload and suggests a download file name.
pub async fn generate_wifi_qr(credentials: WifiCredentials) -> CommandResult<WifiQrDto> {
    match encode_wifi_payload(&credentials) {
        Ok(payload) => CommandResult::ok(WifiQrDto {
            payload,
            file_name: credentials.download_file_name(),
        }),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// All users, newest first (operators only).
pub async fn list_users(state: &AppState, session: &UserSession) -> CommandResult<Vec<UserProfile>> {
    match state.admin.list_users(session.user()).await {
        Ok(users) => CommandResult::ok(users),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Registers a tablet MAC address for `user_id` (operators only).
pub async fn register_mac_address(
    state: &AppState,
    session: &UserSession,
    mac_address: &str,
    user_id: &str,
) -> CommandResult<MacRegistration> {
    match state
        .admin
        .register_mac_address(session.user(), mac_address, user_id)
        .await
    {
        Ok(registration) => CommandResult::ok(registration),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// The `limit` most recent control actions, newest first.
pub async fn control_history(
    state: &AppState,
    limit: usize,
) -> CommandResult<Vec<ControlHistoryEntry>> {
    let history = state.control.history();
    let entries = history.lock().await.recent(limit);
    CommandResult::ok(entries)
}

/// Opens a control dialog for one of `session`'s loaded tablets.
///
/// The acting user recorded in the history is the session's user.  A
/// successful refresh reloads the session's tablet list.
pub fn open_control(
    state: &AppState,
    session: &UserSession,
    tablet_id: &str,
) -> Result<ControlDialog, OpenControlError> {
    let directory = session.directory();
    let tablet = directory
        .find(tablet_id)
        .ok_or_else(|| OpenControlError::UnknownTablet(tablet_id.to_string()))?;
    let actor = session.actor();
    debug!("opening control for {} as {:?}", tablet.id, actor);
    let refresher: Arc<dyn StatusRefresher> = directory.clone();
    Ok(state.control.open_with_refresher(tablet, actor, refresher))
}

/// The control settings in effect.
pub async fn get_control_config(state: &AppState) -> CommandResult<ControlConfig> {
    CommandResult::ok(state.config.control.clone())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
