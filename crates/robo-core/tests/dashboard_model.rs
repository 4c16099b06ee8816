//! Integration tests for the robo-core public API.
//!
//! These drive the domain types together the way the dashboard does: a
//! tablet list feeds the statistics, a control session animates one tablet,
//! and the WiFi form produces a payload.

use robo_core::{
    encode_wifi_payload, search_stores, tablets_in_store, ControlAction, ControlSession,
    ControlStatus, DialogDisposition, FleetSummary, MacAddress, ScreenState, SecurityType,
    SignalLevel, Store, Tablet, WifiCredentials, WifiQrError,
};

fn tablet(id: &str, wifi: &str, battery: &str, is_on: bool, store: &str) -> Tablet {
    Tablet {
        id: id.to_string(),
        mac_address: String::new(),
        table_number: format!("Table {id}"),
        wifi_strength: wifi.to_string(),
        battery_level: battery.to_string(),
        version: "v1.2.3".to_string(),
        ip_address: "192.168.1.100".to_string(),
        firmware_build: "FW-2024.11.28".to_string(),
        is_on,
        store_id: Some(store.to_string()),
    }
}

#[test]
fn test_summary_equals_rounded_mean_of_fields() {
    // Arrange
    let fleet = vec![
        tablet("01", "75%", "85%", true, "store1"),
        tablet("02", "60%", "92%", false, "store1"),
        tablet("03", "80%", "88%", true, "store2"),
    ];

    // Act
    let summary = FleetSummary::from_tablets(&fleet);

    // Assert
    let mean_battery = (85.0 + 92.0 + 88.0) / 3.0_f64;
    let mean_wifi = (75.0 + 60.0 + 80.0) / 3.0_f64;
    assert_eq!(summary.average_battery, mean_battery.round() as i64);
    assert_eq!(summary.average_wifi, mean_wifi.round() as i64);
    assert_eq!(summary.active, 2);
}

#[test]
fn test_store_grouping_and_search_work_together() {
    let fleet = vec![
        tablet("01", "75%", "85%", true, "store1"),
        tablet("02", "60%", "92%", false, "store1"),
        tablet("03", "80%", "88%", true, "store2"),
    ];
    let stores = vec![
        Store {
            id: "store1".to_string(),
            name: "Gangnam".to_string(),
            location: "Seoul".to_string(),
            tablet_count: 2,
        },
        Store {
            id: "store2".to_string(),
            name: "Hongdae".to_string(),
            location: "Seoul".to_string(),
            tablet_count: 3,
        },
    ];

    let found = search_stores(&stores, "gang");
    assert_eq!(found.len(), 1);

    // The displayed count comes from the loaded tablets, not the listing.
    assert_eq!(tablets_in_store(&fleet, &found[0].id).len(), 2);
    assert_eq!(tablets_in_store(&fleet, "store2").len(), 1);
}

#[test]
fn test_failed_restart_returns_dialog_to_original_screen() {
    // Arrange
    let t = tablet("01", "75%", "85%", false, "store1");
    let mut session = ControlSession::new(t);

    // Act
    session.begin(ControlAction::Restart).unwrap();
    assert_eq!(session.screen(), ScreenState::Restarting);
    session.resolve(false).unwrap();
    let disposition = session.settle().unwrap();

    // Assert
    assert_eq!(session.screen(), ScreenState::Off);
    assert_eq!(session.status(), ControlStatus::Idle);
    assert_eq!(disposition, DialogDisposition::StayOpen);
}

#[test]
fn test_successful_restart_goes_through_restarting_to_on() {
    let mut session = ControlSession::new(tablet("01", "75%", "85%", false, "store1"));

    session.begin(ControlAction::Restart).unwrap();
    session.resolve(true).unwrap();
    assert_eq!(session.screen(), ScreenState::Restarting);
    assert!(session.finish_restart());
    assert_eq!(session.screen(), ScreenState::On);
    assert_eq!(session.settle().unwrap(), DialogDisposition::Close);
}

#[test]
fn test_wifi_payload_template_for_every_security_type() {
    for security in [SecurityType::Wpa, SecurityType::Wep, SecurityType::NoPass] {
        let creds = WifiCredentials {
            ssid: "Store WiFi".to_string(),
            password: "pw".to_string(),
            security,
            hidden: true,
        };
        let payload = encode_wifi_payload(&creds).unwrap();
        assert_eq!(payload, format!("WIFI:T:{security};S:Store WiFi;P:pw;H:true;;"));
    }
}

#[test]
fn test_wifi_payload_rejects_empty_password_except_nopass() {
    for security in [SecurityType::Wpa, SecurityType::Wep] {
        let creds = WifiCredentials {
            ssid: "HomeNet".to_string(),
            password: String::new(),
            security,
            hidden: false,
        };
        assert_eq!(
            encode_wifi_payload(&creds),
            Err(WifiQrError::MissingPassword(security))
        );
    }
}

#[test]
fn test_signal_levels_from_tablet_fields() {
    let t = tablet("01", "75%", "50%", true, "store1");
    assert_eq!(t.wifi_signal(), SignalLevel::Strong);
    assert_eq!(t.battery_signal(), SignalLevel::Weak);
}

#[test]
fn test_mac_address_normalizes_for_storage() {
    let mac: MacAddress = "0a-1b-2c-3d-4e-5f".parse().unwrap();
    assert_eq!(mac.to_string(), "0A:1B:2C:3D:4E:5F");
}
