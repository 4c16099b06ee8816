//! robo-web-bridge library crate.
//!
//! Lets the browser dashboard drive the fleet console over a WebSocket.
//!
//! # Architecture
//!
//! ```text
//! Browser (JSON over WebSocket)
//!         ↕
//! [robo-web-bridge]
//!   ├── domain/           BrowserRequest / ServerMsg, BridgeConfig
//!   ├── application/      BridgeSession: one browser tab's commands + dialog
//!   └── infrastructure/
//!         └── ws_server/  WebSocket accept loop (tokio-tungstenite)
//!         ↕
//! robo-console AppState (shared by every session)
//! ```
//!
//! # Layer rules
//!
//! - `domain` holds plain serde types and no I/O.
//! - `application` depends on `domain` and the console's command bridge.
//! - `infrastructure` adds sockets, tasks and framing.

/// Domain layer: protocol messages and configuration.
pub mod domain;

/// Application layer: per-session command handling.
pub mod application;

/// Infrastructure layer: WebSocket server.
pub mod infrastructure;
