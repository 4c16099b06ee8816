//! WiFi QR payload encoder.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Network security type as written in the `T:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SecurityType {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    /// Open network; no password field is required.
    #[serde(rename = "nopass")]
    NoPass,
}

impl SecurityType {
    /// The token written into the payload.
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityType::Wpa => "WPA",
            SecurityType::Wep => "WEP",
            SecurityType::NoPass => "nopass",
        }
    }

    pub fn requires_password(self) -> bool {
        self != SecurityType::NoPass
    }
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityType {
    type Err = WifiQrError;

    /// Accepts the payload tokens in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wpa" => Ok(SecurityType::Wpa),
            "wep" => Ok(SecurityType::Wep),
            "nopass" => Ok(SecurityType::NoPass),
            _ => Err(WifiQrError::UnknownSecurity(s.to_string())),
        }
    }
}

/// Validation failures.  No payload is produced when any of these occur.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WifiQrError {
    #[error("network name (SSID) is required")]
    MissingSsid,

    #[error("password is required for {0} networks")]
    MissingPassword(SecurityType),

    #[error("unknown security type '{0}' (expected WPA, WEP or nopass)")]
    UnknownSecurity(String),
}

/// Form fields entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub security: SecurityType,
    #[serde(default)]
    pub hidden: bool,
}

impl WifiCredentials {
    /// Checks the required fields.
    ///
    /// Only blankness is checked; the values themselves are used verbatim.
    ///
    /// # Errors
    ///
    /// - [`WifiQrError::MissingSsid`] when the SSID is blank.
    /// - [`WifiQrError::MissingPassword`] when the password is blank and the
    ///   security type needs one.
    pub fn validate(&self) -> Result<(), WifiQrError> {
        if self.ssid.trim().is_empty() {
            return Err(WifiQrError::MissingSsid);
        }
        if self.security.requires_password() && self.password.trim().is_empty() {
            return Err(WifiQrError::MissingPassword(self.security));
        }
        Ok(())
    }

    /// File name offered when the rendered QR image is downloaded.
    pub fn download_file_name(&self) -> String {
        let name = if self.ssid.is_empty() { "network" } else { &self.ssid };
        format!("wifi-qr-{name}.png")
    }
}

/// Builds the QR payload string for `credentials`.
///
/// ```rust
/// use robo_core::{encode_wifi_payload, SecurityType, WifiCredentials};
///
/// let creds = WifiCredentials {
///     ssid: "HomeNet".to_string(),
///     password: "secret123".to_string(),
///     security: SecurityType::Wpa,
///     hidden: false,
/// };
/// assert_eq!(
///     encode_wifi_payload(&creds).unwrap(),
///     "WIFI:T:WPA;S:HomeNet;P:secret123;H:false;;"
/// );
/// ```
///
/// # Errors
///
/// See [`WifiCredentials::validate`].
pub fn encode_wifi_payload(credentials: &WifiCredentials) -> Result<String, WifiQrError> {
    credentials.validate()?;
    let payload = format!(
        "WIFI:T:{};S:{};P:{};H:{};;",
        credentials.security, credentials.ssid, credentials.password, credentials.hidden
    );
    tracing::debug!(
        "built WiFi payload for ssid={} security={}",
        credentials.ssid,
        credentials.security
    );
    Ok(payload)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
