//! WiFi QR code payloads.
//!
//! Phones recognise a QR code whose text has the form
//! `WIFI:T:<security>;S:<ssid>;P:<password>;H:<hidden>;;` and offer to join
//! the network.  Staff print one of these per store so guests' tablets and
//! phones can connect without typing the password.
//!
//! Only the text payload is produced here; turning it into an image is the
//! job of whatever renders the dashboard.

pub mod payload;

pub use payload::{encode_wifi_payload, SecurityType, WifiCredentials, WifiQrError};
