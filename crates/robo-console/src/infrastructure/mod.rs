//! Infrastructure layer for the fleet console.
//!
//! Contains the adapters behind the application ports: the backend
//! (identity provider + document store, in memory), placeholder fleet data,
//! the simulated device link, file-system configuration and the UI command
//! bridge used by the WebSocket bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `robo_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod backend;
pub mod device_link;
pub mod storage;
pub mod ui_bridge;
