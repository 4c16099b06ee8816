//! Application layer use cases for the fleet console.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules in `robo-core`) and the infrastructure (document
//! store, identity provider, config files, simulated device link).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil an operator goal (e.g., "turn
//!   tablet 3 off and show the result").
//! - **Depend on abstractions** (the traits in [`ports`]) rather than concrete
//!   implementations, so the in-memory backend can be swapped for a real one
//!   without changing this code.
//! - **Contain no file system access and no direct network I/O**.
//!
//! # Sub-modules
//!
//! - **`ports`** – Traits for every outside collaborator: document store,
//!   identity provider, store catalog, device link, status refresher; plus
//!   the [`ports::BackendClient`] bundle handed to use cases.
//!
//! - **`records`** – Mapping between store documents and domain records.
//!
//! - **`control_device`** – Control dialogs: runs one simulated action at a
//!   time per tablet, drives the timers and publishes dialog snapshots.
//!
//! - **`control_history`** – Bounded log of resolved control actions.
//!
//! - **`manage_tablets`** – The tablet directory: placeholder list first,
//!   then the signed-in user's tablets from the document store.
//!
//! - **`session`** – One client's signed-in user and tablet directory;
//!   sign-in syncs the profile and loads the tablets, sign-out clears them.
//!
//! - **`user_sync`** – Mirrors the signed-in user's profile into `users`.
//!
//! - **`admin`** – Operator checks, user listing and MAC registration.

pub mod admin;
pub mod control_device;
pub mod control_history;
pub mod manage_tablets;
pub mod ports;
pub mod records;
pub mod session;
pub mod user_sync;
