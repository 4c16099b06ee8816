//! TOML-based configuration persistence for the fleet console.
//!
//! Reads `AppConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\RoboCloud\config.toml`
//! - Linux:    `~/.config/robocloud/config.toml`
//! - macOS:    `~/Library/Application Support/RoboCloud/config.toml`
//!
//! Example file:
//!
//! ```toml
//! [console]
//! log_level = "debug"
//! operators = ["ops@example.com"]
//!
//! [control]
//! latency_ms = 1500
//! success_probability = 0.9
//! seed = 42
//!
//! [fleet]
//! show_placeholders = true
//! ```
//!
//! # Serde default values (for beginners)
//!
//! Every field carries `#[serde(default = "some_fn")]`, so a file that only
//! names the values it wants to change is still complete.  A missing file is
//! the same as an empty one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::control_device::ControlTimings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level console configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
}

/// General console settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    /// Schema version string.
    #[serde(default = "default_version")]
    pub version: String,
    /// `tracing` log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emails written to the `admins` collection at startup.
    #[serde(default)]
    pub operators: Vec<String>,
}

/// Device control timings and the simulated link's behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlConfig {
    /// Simulated round-trip time of one action.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Probability that the simulated tablet acknowledges an action.
    #[serde(default = "default_success_probability")]
    pub success_probability: f64,
    /// Pause between a successful restart and the screen coming back.
    #[serde(default = "default_restart_settle_ms")]
    pub restart_settle_ms: u64,
    /// How long a resolved status stays visible.
    #[serde(default = "default_dismiss_after_ms")]
    pub dismiss_after_ms: u64,
    /// Fixed RNG seed for reproducible outcomes; entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Number of control history entries kept in memory.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Fleet listing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FleetConfig {
    /// Show the demo tablets while loading and when the user has none.
    #[serde(default = "default_true")]
    pub show_placeholders: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    "1.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_latency_ms() -> u64 {
    1500
}
fn default_success_probability() -> f64 {
    0.9
}
fn default_restart_settle_ms() -> u64 {
    500
}
fn default_dismiss_after_ms() -> u64 {
    2000
}
fn default_history_limit() -> usize {
    crate::application::control_history::DEFAULT_HISTORY_LIMIT
}
fn default_true() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: default_log_level(),
            operators: Vec::new(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            success_probability: default_success_probability(),
            restart_settle_ms: default_restart_settle_ms(),
            dismiss_after_ms: default_dismiss_after_ms(),
            seed: None,
            history_limit: default_history_limit(),
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            show_placeholders: default_true(),
        }
    }
}

impl ControlConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Timings for [`crate::application::control_device::ControlDeviceUseCase`].
    pub fn timings(&self) -> ControlTimings {
        ControlTimings {
            restart_settle: Duration::from_millis(self.restart_settle_ms),
            dismiss_after: Duration::from_millis(self.dismiss_after_ms),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file, returning defaults if the
/// file does not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from an explicit path.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RoboCloud"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("robocloud"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RoboCloud")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
