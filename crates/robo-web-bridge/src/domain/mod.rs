//! Domain layer for robo-web-bridge.
//!
//! The JSON "language" spoken between the browser and the bridge, and the
//! bridge's runtime settings.  Nothing here opens a socket or spawns a task.

pub mod config;
pub mod messages;

pub use config::BridgeConfig;
pub use messages::{BrowserRequest, ServerMsg};
