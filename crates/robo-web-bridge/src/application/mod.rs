//! Application layer for robo-web-bridge.
//!
//! Knows *what* each browser request means for the console.  It does not
//! know about sockets or frames.
//!
//! # Responsibilities
//!
//! - Dispatching each [`BrowserRequest`](crate::domain::BrowserRequest) to
//!   the console's command bridge
//! - Owning the one control dialog a browser tab may have open
//! - Defining the `BridgeError` type for application-level failures

pub mod bridge_service;

pub use bridge_service::{parse_request, BridgeError, BridgeSession};
