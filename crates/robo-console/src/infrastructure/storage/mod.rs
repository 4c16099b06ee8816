//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the console's TOML settings from the
//! platform config directory and falls back to defaults on first run.

pub mod config;
