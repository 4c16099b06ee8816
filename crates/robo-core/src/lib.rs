//! # robo-core
//!
//! Shared domain library for ROBO Cloud, the remote-management console for
//! table-side restaurant tablets.
//!
//! This crate is used by the console application and the WebSocket bridge.
//! It has zero dependencies on network sockets, async runtimes, or the
//! authentication / document-store backend.
//!
//! # Architecture overview (for beginners)
//!
//! An operator manages a fleet of tablets spread across several stores.  From
//! the dashboard they can see each tablet's battery and WiFi strength, search
//! stores, and open a *control dialog* to power a tablet on or off, restart
//! it, or refresh its status.
//!
//! This crate (`robo-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure business rules: the [`Tablet`] record, the control
//!   dialog state machine ([`ControlSession`]), fleet statistics
//!   ([`FleetSummary`]) and MAC address parsing.
//!
//! - **`wifi`** – The WiFi QR payload encoder that turns network credentials
//!   into the `WIFI:T:...;;` string phones understand.

pub mod domain;
pub mod wifi;

// Re-export the most-used types at the crate root so callers can write
// `robo_core::Tablet` instead of `robo_core::domain::tablet::Tablet`.
pub use domain::control::{
    ControlAction, ControlError, ControlSession, ControlStatus, DialogDisposition, ScreenState,
};
pub use domain::fleet::{
    firmware_distribution, rounded_mean, search_stores, tablets_in_store, version_distribution,
    DistributionEntry, FleetSummary, SignalLevel, Store,
};
pub use domain::mac::{MacAddress, MacAddressError};
pub use domain::tablet::{parse_percent, Tablet, TabletId};
pub use wifi::payload::{encode_wifi_payload, SecurityType, WifiCredentials, WifiQrError};
