//! robo-console library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`,
//! the binary entry point in `main.rs` and the WebSocket bridge share the
//! same module tree.

pub mod application;
pub mod infrastructure;
