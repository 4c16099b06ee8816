//! Domain entities for ROBO Cloud.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from network libraries, database drivers, or UI
//!   frameworks.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Code in outer layers (backend adapters, use cases, the WebSocket bridge)
//! depends on the domain, but the domain never depends on them.

/// The tablet record and percentage parsing.
pub mod tablet;

/// The control dialog state machine.
///
/// See [`control::ControlSession`] for the main type.
pub mod control;

/// Fleet statistics, store grouping and search.
pub mod fleet;

/// MAC address validation for tablet registration.
pub mod mac;
