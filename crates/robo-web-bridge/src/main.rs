//! ROBO Cloud WebSocket bridge: entry point.
//!
//! Serves the browser dashboard.  Each browser tab opens one WebSocket and
//! drives the fleet console with JSON requests; while a control dialog is
//! open the bridge also pushes every change to it.
//!
//! # Usage
//!
//! ```text
//! robo-web-bridge [OPTIONS]
//!
//! Options:
//!   --ws-port       <PORT> WebSocket listener port [default: 24900]
//!   --ws-bind       <IP>   Bind address [default: 0.0.0.0]
//!   --ping-interval <SECS> Keepalive ping interval in seconds [default: 15]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable             | Default   | Description                    |
//! |----------------------|-----------|--------------------------------|
//! | `ROBO_WS_PORT`       | `24900`   | WebSocket listener port        |
//! | `ROBO_WS_BIND`       | `0.0.0.0` | Bind address                   |
//! | `ROBO_PING_INTERVAL` | `15`      | Keepalive ping interval (secs) |
//!
//! Backend selection uses the same variables as `robo-console`.  Operators
//! listed under `[console] operators` in the config file are seeded before
//! the listener starts.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use robo_console::infrastructure::backend::{connect, BackendConfig};
use robo_console::infrastructure::storage::config::{load_config, AppConfig};
use robo_console::infrastructure::ui_bridge::AppState;
use robo_web_bridge::domain::config::DEFAULT_WS_PORT;
use robo_web_bridge::domain::BridgeConfig;
use robo_web_bridge::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// ROBO Cloud WebSocket bridge.
#[derive(Debug, Parser)]
#[command(
    name = "robo-web-bridge",
    about = "WebSocket bridge between the ROBO Cloud dashboard and the fleet console",
    version
)]
struct Cli {
    /// TCP port for the WebSocket server to listen on.
    #[arg(long, default_value_t = DEFAULT_WS_PORT, env = "ROBO_WS_PORT")]
    ws_port: u16,

    /// IP address to bind the WebSocket server to.
    ///
    /// Use `127.0.0.1` to accept only local connections.
    #[arg(long, default_value = "0.0.0.0", env = "ROBO_WS_BIND")]
    ws_bind: String,

    /// Seconds between WebSocket pings to each browser.
    #[arg(long, default_value_t = 15, env = "ROBO_PING_INTERVAL")]
    ping_interval: u64,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`BridgeConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--ws-bind` is not a valid IP address or
    /// `--ping-interval` is zero.
    fn into_bridge_config(self) -> anyhow::Result<BridgeConfig> {
        let ws_bind_addr: SocketAddr = format!("{}:{}", self.ws_bind, self.ws_port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid WebSocket bind address: '{}:{}'",
                    self.ws_bind, self.ws_port
                )
            })?;
        if self.ping_interval == 0 {
            anyhow::bail!("--ping-interval must be at least 1 second");
        }

        Ok(BridgeConfig {
            ws_bind_addr,
            ping_interval: Duration::from_secs(self.ping_interval),
            ..BridgeConfig::default()
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (app_config, config_error) = match load_config() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.console.log_level)),
        )
        .init();

    if let Some(e) = config_error {
        warn!("using default configuration: {e}");
    }

    let config = cli.into_bridge_config()?;
    info!(
        "ROBO Cloud WebSocket bridge starting, ws={}",
        config.ws_bind_addr
    );

    let backend = connect(&BackendConfig::from_env());
    let state = AppState::start(backend, app_config).await;

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    let result = run_server(config, state, running).await;

    info!("ROBO Cloud WebSocket bridge stopped");
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────
