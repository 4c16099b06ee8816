//! MAC address parsing for tablet registration.
//!
//! Operators type the address printed on the tablet's label.  Both `:` and
//! `-` separators are accepted, in either case; the stored form is always
//! upper-case and colon-separated (`AA:BB:CC:DD:EE:FF`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a MAC address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MacAddressError {
    /// Nothing (or only whitespace) was entered.
    #[error("MAC address is empty")]
    Empty,

    /// The text is not six two-digit hex octets.
    #[error("invalid MAC address '{0}': expected six hex octets like AA:BB:CC:DD:EE:FF")]
    Malformed(String),
}

/// A validated, normalized MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = MacAddressError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(MacAddressError::Empty);
        }

        let malformed = || MacAddressError::Malformed(text.to_string());
        let mut octets = [0u8; 6];
        let mut parts = text.split(|c| c == ':' || c == '-');
        for slot in octets.iter_mut() {
            let part = parts.next().ok_or_else(malformed)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed());
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| malformed())?;
        }
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(MacAddress(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl Serialize for MacAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colon_form() {
        let mac: MacAddress = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        assert_eq!(mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    }

    #[test]
    fn test_parse_normalizes_case_and_separator() {
        let mac: MacAddress = "  aa-bb-cc-dd-ee-01 ".parse().unwrap();
        assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:01");
    }

    #[test]
    fn test_parse_empty_is_rejected() {
        assert_eq!("   ".parse::<MacAddress>(), Err(MacAddressError::Empty));
    }

    #[test]
    fn test_parse_rejects_wrong_octet_count() {
        assert!("AA:BB:CC:DD:EE".parse::<MacAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:FF:00".parse::<MacAddress>().is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex_and_short_octets() {
        assert!("GG:BB:CC:DD:EE:FF".parse::<MacAddress>().is_err());
        assert!("A:BB:CC:DD:EE:FF".parse::<MacAddress>().is_err());
        assert!("AABBCCDDEEFF".parse::<MacAddress>().is_err());
    }

    #[test]
    fn test_serde_uses_display_form() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"AA:BB:CC:DD:EE:FF\"");
        let back: MacAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mac);
    }
}
