//! The tablet record.
//!
//! A [`Tablet`] is one managed device sitting on a restaurant table.  The
//! telemetry fields (`wifi_strength`, `battery_level`) are kept as the
//! percentage *strings* the document store holds (e.g. `"85%"`, or `"N/A"`
//! when the device never reported); [`parse_percent`] turns them into numbers
//! for statistics and signal bars.

use serde::{Deserialize, Serialize};

use super::fleet::SignalLevel;

/// Document identifier of a tablet in the `tablets` collection.
pub type TabletId = String;

/// One managed tablet as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tablet {
    /// Document id.
    pub id: TabletId,
    /// Hardware MAC address; empty when the tablet was never registered.
    pub mac_address: String,
    /// Table label shown to staff (e.g. `"Table 01"`).
    pub table_number: String,
    /// WiFi signal strength as a percentage string.
    pub wifi_strength: String,
    /// Battery level as a percentage string.
    pub battery_level: String,
    /// App version (e.g. `"v1.2.3"`).
    pub version: String,
    /// LAN IP address.
    pub ip_address: String,
    /// Firmware build id (e.g. `"FW-2024.11.28"`).
    pub firmware_build: String,
    /// `true` when the tablet screen is powered on.
    pub is_on: bool,
    /// Store the tablet is installed in, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

impl Tablet {
    /// Battery level as a whole percentage (0 when unparseable).
    pub fn battery_percent(&self) -> i64 {
        parse_percent(&self.battery_level)
    }

    /// WiFi strength as a whole percentage (0 when unparseable).
    pub fn wifi_percent(&self) -> i64 {
        parse_percent(&self.wifi_strength)
    }

    /// Colour band for the WiFi bar.
    pub fn wifi_signal(&self) -> SignalLevel {
        SignalLevel::for_wifi(self.wifi_percent())
    }

    /// Colour band for the battery bar.
    pub fn battery_signal(&self) -> SignalLevel {
        SignalLevel::for_battery(self.battery_percent())
    }

    /// `"ON"` / `"OFF"` label for the status column.
    pub fn power_label(&self) -> &'static str {
        if self.is_on {
            "ON"
        } else {
            "OFF"
        }
    }
}

/// Parses a percentage string into an integer.
///
/// Leading whitespace is skipped, an optional `+`/`-` sign is accepted, and
/// then as many decimal digits as are present are read.  Anything after the
/// digits (such as the `%` suffix) is ignored.  Strings with no leading digits
/// (`"N/A"`, `""`) yield `0`.
///
/// ```rust
/// use robo_core::parse_percent;
///
/// assert_eq!(parse_percent("85%"), 85);
/// assert_eq!(parse_percent(" 7"), 7);
/// assert_eq!(parse_percent("N/A"), 0);
/// ```
pub fn parse_percent(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if !seen_digit {
        return 0;
    }
    if negative {
        -value
    } else {
        value
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
