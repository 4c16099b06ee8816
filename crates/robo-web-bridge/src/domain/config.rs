//! Bridge configuration types.
//!
//! [`BridgeConfig`] is built once in `main.rs` from CLI arguments (which fall
//! back to environment variables) and then shared by every session.

use std::net::SocketAddr;
use std::time::Duration;

/// Default WebSocket listener port.
pub const DEFAULT_WS_PORT: u16 = 24900;

/// All runtime configuration for the WebSocket bridge.
///
/// # Example
///
/// ```rust
/// use robo_web_bridge::domain::BridgeConfig;
///
/// let cfg = BridgeConfig::default();
/// assert_eq!(cfg.ws_bind_addr.port(), 24900);
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// The address and port the WebSocket server binds to.
    ///
    /// `0.0.0.0` accepts connections on every interface; `127.0.0.1` only
    /// from the local machine.
    pub ws_bind_addr: SocketAddr,

    /// How often the bridge sends a WebSocket ping to each browser.
    ///
    /// Keeps idle connections open through proxies that drop silent sockets.
    pub ping_interval: Duration,

    /// Capacity of each session's outbound message queue.
    pub outbound_queue: usize,
}

impl Default for BridgeConfig {
    /// | Field          | Default         |
    /// |----------------|-----------------|
    /// | ws_bind_addr   | `0.0.0.0:24900` |
    /// | ping_interval  | 15 seconds      |
    /// | outbound_queue | 64 messages     |
    fn default() -> Self {
        Self {
            ws_bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_WS_PORT)),
            ping_interval: Duration::from_secs(15),
            outbound_queue: 64,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
