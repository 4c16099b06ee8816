//! Infrastructure layer for robo-web-bridge.
//!
//! # Responsibilities
//!
//! - Binding a TCP listener for browser WebSocket connections
//! - Performing the WebSocket HTTP upgrade handshake
//! - Spawning per-session Tokio tasks
//! - Handling the graceful shutdown signal

pub mod ws_server;

pub use ws_server::{run_server, serve};
