//! End-to-end WebSocket session tests.
//!
//! Each test binds the bridge on an ephemeral localhost port, connects a
//! real WebSocket client and exchanges JSON frames with it.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use robo_console::infrastructure::backend::in_memory_client;
use robo_console::infrastructure::storage::config::AppConfig;
use robo_console::infrastructure::ui_bridge::AppState;
use robo_web_bridge::domain::BridgeConfig;
use robo_web_bridge::infrastructure::serve;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Bridge {
    url: String,
    running: Arc<AtomicBool>,
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Starts a bridge whose device link always acknowledges after `latency_ms`.
async fn start_bridge(latency_ms: u64) -> Bridge {
    let mut app_config = AppConfig::default();
    app_config.control.success_probability = 1.0;
    app_config.control.latency_ms = latency_ms;
    app_config.control.restart_settle_ms = 50;
    app_config.control.dismiss_after_ms = 200;
    app_config.control.seed = Some(3);
    let state = AppState::new(in_memory_client(), app_config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = BridgeConfig {
        ws_bind_addr: addr,
        ..BridgeConfig::default()
    };
    let running = Arc::new(AtomicBool::new(true));
    tokio::spawn(serve(listener, config, state, Arc::clone(&running)));

    Bridge {
        url: format!("ws://{addr}"),
        running,
    }
}

async fn connect(bridge: &Bridge) -> Client {
    let (client, _response) = connect_async(bridge.url.as_str()).await.unwrap();
    client
}

async fn send(client: &mut Client, value: Value) {
    client.send(Message::Text(value.to_string())).await.unwrap();
}

/// Next JSON frame from the bridge, skipping keepalive frames.
async fn next_json(client: &mut Client) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Next `Reply` frame, skipping any control updates queued before it.
async fn next_reply(client: &mut Client) -> Value {
    loop {
        let msg = next_json(client).await;
        if msg["type"] == "Reply" {
            return msg;
        }
    }
}

async fn sign_in(client: &mut Client) {
    sign_in_as(client, "owner@example.com").await;
}

async fn sign_in_as(client: &mut Client, email: &str) {
    send(client, json!({"type": "SignIn", "email": email})).await;
    let reply = next_reply(client).await;
    assert_eq!(reply["request"], "SignIn");
    assert_eq!(reply["success"], true);
}

#[tokio::test]
async fn test_sign_in_and_list_tablets() {
    // Arrange
    let bridge = start_bridge(50).await;
    let mut client = connect(&bridge).await;

    // Act
    sign_in(&mut client).await;
    send(&mut client, json!({"type": "ListTablets"})).await;
    let reply = next_reply(&mut client).await;

    // Assert
    assert_eq!(reply["success"], true);
    let tablets = reply["data"]["tablets"].as_array().unwrap();
    assert_eq!(tablets.len(), 3);
    assert_eq!(tablets[0]["id"], "dummy1");
    assert_eq!(tablets[0]["powerLabel"], "ON");
    assert_eq!(reply["data"]["summary"]["active"], 2);
}

#[tokio::test]
async fn test_malformed_frame_keeps_session_open() {
    // Arrange
    let bridge = start_bridge(50).await;
    let mut client = connect(&bridge).await;

    // Act
    client.send(Message::Text("{nope".to_string())).await.unwrap();
    let error = next_json(&mut client).await;
    send(&mut client, json!({"type": "SearchStores", "query": "강남"})).await;
    let reply = next_reply(&mut client).await;

    // Assert
    assert_eq!(error["type"], "Error");
    assert_eq!(reply["success"], true);
    assert_eq!(reply["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_control_flow_pushes_updates_until_dismissed() {
    // Arrange
    let bridge = start_bridge(50).await;
    let mut client = connect(&bridge).await;
    sign_in(&mut client).await;

    send(&mut client, json!({"type": "OpenControl", "tabletId": "dummy2"})).await;
    let opened = next_reply(&mut client).await;
    assert_eq!(opened["success"], true);
    assert_eq!(opened["data"]["screen"], "off");

    // Act
    send(&mut client, json!({"type": "ExecuteControl", "action": "turnOn"})).await;
    let mut execute_reply = None;
    let mut statuses = Vec::new();
    loop {
        let msg = next_json(&mut client).await;
        match msg["type"].as_str() {
            Some("Reply") => execute_reply = Some(msg),
            Some("ControlUpdate") => {
                let snapshot = &msg["snapshot"];
                statuses.push(snapshot["status"].as_str().unwrap_or_default().to_string());
                if snapshot["open"] == false {
                    break;
                }
            }
            other => panic!("unexpected frame type {other:?}"),
        }
    }

    // Assert
    let execute_reply = execute_reply.expect("no reply to ExecuteControl");
    assert_eq!(execute_reply["request"], "ExecuteControl");
    assert_eq!(execute_reply["success"], true);
    assert!(statuses.iter().any(|s| s == "succeeded"));
    assert_eq!(statuses.last().map(String::as_str), Some("idle"));
}

#[tokio::test]
async fn test_second_session_sees_control_lock() {
    // Arrange: the lock is shared by every browser on the same bridge.
    let bridge = start_bridge(2_000).await;
    let mut first = connect(&bridge).await;
    let mut second = connect(&bridge).await;
    sign_in(&mut first).await;
    sign_in_as(&mut second, "guest@example.com").await;

    send(&mut first, json!({"type": "OpenControl", "tabletId": "dummy1"})).await;
    next_reply(&mut first).await;
    send(&mut second, json!({"type": "OpenControl", "tabletId": "dummy3"})).await;
    next_reply(&mut second).await;

    // Act
    send(&mut first, json!({"type": "ExecuteControl", "action": "restart"})).await;
    let first_reply = next_reply(&mut first).await;
    send(&mut second, json!({"type": "ExecuteControl", "action": "turnOff"})).await;
    let second_reply = next_reply(&mut second).await;

    // Assert
    assert_eq!(first_reply["success"], true);
    assert_eq!(second_reply["success"], false);
    assert!(second_reply["error"].as_str().unwrap_or_default().contains("dummy1"));
}

#[tokio::test]
async fn test_sign_in_is_per_connection() {
    // Arrange
    let bridge = start_bridge(50).await;
    let mut first = connect(&bridge).await;
    let mut second = connect(&bridge).await;
    sign_in(&mut first).await;

    // Act
    send(&mut second, json!({"type": "CurrentUser"})).await;
    let second_user = next_reply(&mut second).await;
    send(&mut second, json!({"type": "SignOut"})).await;
    next_reply(&mut second).await;
    send(&mut first, json!({"type": "CurrentUser"})).await;
    let first_user = next_reply(&mut first).await;

    // Assert
    assert_eq!(second_user["success"], true);
    assert!(second_user["data"].is_null());
    assert_eq!(first_user["data"]["email"], "owner@example.com");
}
