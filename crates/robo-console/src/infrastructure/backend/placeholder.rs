//! Placeholder fleet data.
//!
//! The dashboard shows these tablets while the real list loads (and keeps
//! showing them when the user has no tablets stored).  The store listing is
//! not backed by the document store yet, so [`PlaceholderStoreCatalog`]
//! serves a fixed set.

use async_trait::async_trait;
use robo_core::{Store, Tablet};

use crate::application::ports::{BackendError, StoreCatalog};

fn tablet(
    id: &str,
    table: &str,
    wifi: &str,
    battery: &str,
    ip: &str,
    is_on: bool,
    store: &str,
) -> Tablet {
    Tablet {
        id: id.to_string(),
        mac_address: String::new(),
        table_number: table.to_string(),
        wifi_strength: wifi.to_string(),
        battery_level: battery.to_string(),
        version: "v1.2.3".to_string(),
        ip_address: ip.to_string(),
        firmware_build: "FW-2024.11.28".to_string(),
        is_on,
        store_id: Some(store.to_string()),
    }
}

/// The three demo tablets.
pub fn placeholder_tablets() -> Vec<Tablet> {
    vec![
        tablet("dummy1", "Table 01", "75%", "85%", "192.168.1.100", true, "store1"),
        tablet("dummy2", "Table 02", "60%", "92%", "192.168.1.101", false, "store1"),
        tablet("dummy3", "Table 03", "80%", "88%", "192.168.1.102", true, "store2"),
    ]
}

/// The demo store listing.
pub fn placeholder_stores() -> Vec<Store> {
    let store = |id: &str, name: &str, location: &str, tablet_count: u32| Store {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        tablet_count,
    };
    vec![
        store("store1", "강남점", "서울시 강남구", 2),
        store("store2", "홍대점", "서울시 마포구", 3),
        store("store3", "명동점", "서울시 중구", 1),
    ]
}

/// Serves [`placeholder_stores`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderStoreCatalog;

#[async_trait]
impl StoreCatalog for PlaceholderStoreCatalog {
    async fn list_stores(&self) -> Result<Vec<Store>, BackendError> {
        Ok(placeholder_stores())
    }
}
