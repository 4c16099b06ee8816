//! ROBO Cloud fleet console: headless entry point.
//!
//! Drives the same commands the browser dashboard uses, from a terminal.
//!
//! # Usage
//!
//! ```text
//! robo-console [--json] <COMMAND>
//!
//! Commands:
//!   tablets  --email <EMAIL>                   Tablet table and stat cards
//!   stores   [QUERY] [--email <EMAIL>]         Store search
//!   wifi-qr  --ssid <SSID> [--password <PW>]   WiFi QR payload
//!            [--security WPA|WEP|nopass] [--hidden]
//!   control  --email <EMAIL> <TABLET> <ACTION> Run one control action
//!            [--history]
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()            -- console settings (log level, timings)
//!  └─ connect(BackendConfig)   -- identity provider + document store
//!  └─ AppState::start()        -- control use case, admin, operator seeding
//!  └─ AppState::new_session()  -- this invocation's sign-in and tablets
//!  └─ run the subcommand through ui_bridge
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use robo_console::application::control_device::ControlOutcome;
use robo_console::application::session::UserSession;
use robo_console::infrastructure::backend::{connect, BackendConfig};
use robo_console::infrastructure::storage::config::{load_config, AppConfig};
use robo_console::infrastructure::ui_bridge::{self, AppState, CommandResult};
use robo_core::{ControlAction, SecurityType, WifiCredentials};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// ROBO Cloud fleet console.
#[derive(Debug, Parser)]
#[command(name = "robo-console", about = "Manage ROBO Cloud tablets from a terminal", version)]
struct Cli {
    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the signed-in user's tablets with fleet statistics.
    Tablets {
        #[arg(long, env = "ROBO_EMAIL")]
        email: String,
    },
    /// Search stores by name or location.
    Stores {
        /// Text to search for; lists every store when omitted.
        #[arg(default_value = "")]
        query: String,
        /// Sign in first so the loaded tablet counts are filled in.
        #[arg(long, env = "ROBO_EMAIL")]
        email: Option<String>,
    },
    /// Build a WiFi QR payload.
    WifiQr {
        #[arg(long)]
        ssid: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value_t = SecurityType::Wpa)]
        security: SecurityType,
        #[arg(long)]
        hidden: bool,
    },
    /// Issue one control action and wait for the dialog to settle.
    Control {
        #[arg(long, env = "ROBO_EMAIL")]
        email: String,
        /// Tablet id as listed by `tablets`.
        tablet: String,
        /// turn-on, turn-off, restart or refresh.
        #[arg(value_parser = parse_action)]
        action: ControlAction,
        /// Show the control history afterwards.
        #[arg(long)]
        history: bool,
    },
}

fn parse_action(token: &str) -> Result<ControlAction, String> {
    ControlAction::parse(token)
        .ok_or_else(|| format!("unknown action '{token}' (turn-on, turn-off, restart, refresh)"))
}

// ── Output helpers ────────────────────────────────────────────────────────────

/// Unwraps a command result, turning a failure into an error for `main`.
fn into_data<T: Serialize>(result: CommandResult<T>) -> anyhow::Result<T> {
    match (result.success, result.data) {
        (true, Some(data)) => Ok(data),
        _ => bail!(result.error.unwrap_or_else(|| "command failed".to_string())),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn sign_in(state: &AppState, session: &mut UserSession, email: &str) -> anyhow::Result<()> {
    let user = into_data(ui_bridge::sign_in(state, session, email).await)
        .with_context(|| format!("sign-in failed for {email}"))?;
    info!("signed in as {} (operator: {})", user.uid, user.is_operator);
    Ok(())
}

// ── Subcommands ───────────────────────────────────────────────────────────────

async fn run(state: &AppState, command: Command, json: bool) -> anyhow::Result<()> {
    let mut session = state.new_session();
    match command {
        Command::Tablets { email } => {
            sign_in(state, &mut session, &email).await?;
            let fleet = into_data(ui_bridge::list_tablets(&session).await)?;
            if json {
                return print_json(&fleet);
            }
            println!(
                "{} tablets, {} active, battery {}%, wifi {}%",
                fleet.summary.total,
                fleet.summary.active,
                fleet.summary.average_battery,
                fleet.summary.average_wifi
            );
            for row in &fleet.tablets {
                let t = &row.tablet;
                println!(
                    "{:<10} {:<10} {:<4} wifi {:>5} battery {:>5} {:<8} {:<15} {}",
                    t.id,
                    t.table_number,
                    row.power_label,
                    t.wifi_strength,
                    t.battery_level,
                    t.version,
                    t.ip_address,
                    t.firmware_build
                );
            }
        }
        Command::Stores { query, email } => {
            if let Some(email) = email {
                sign_in(state, &mut session, &email).await?;
            }
            let stores = into_data(ui_bridge::search_stores(state, &session, &query).await)?;
            if json {
                return print_json(&stores);
            }
            for s in &stores {
                println!(
                    "{:<8} {:<8} {:<12} {} tablets ({} loaded)",
                    s.id, s.name, s.location, s.tablet_count, s.loaded_tablets
                );
            }
        }
        Command::WifiQr {
            ssid,
            password,
            security,
            hidden,
        } => {
            let credentials = WifiCredentials {
                ssid,
                password,
                security,
                hidden,
            };
            let qr = into_data(ui_bridge::generate_wifi_qr(credentials).await)?;
            if json {
                return print_json(&qr);
            }
            println!("{}", qr.payload);
            println!("save as: {}", qr.file_name);
        }
        Command::Control {
            email,
            tablet,
            action,
            history,
        } => {
            sign_in(state, &mut session, &email).await?;
            let dialog = ui_bridge::open_control(state, &session, &tablet)?;
            let mut updates = dialog.subscribe();
            let pending = dialog.execute(action).await?;

            let printer = tokio::spawn(async move {
                while updates.changed().await.is_ok() {
                    let snapshot = updates.borrow_and_update().clone();
                    println!(
                        "{}: status {} screen {:?}{}",
                        snapshot.tablet_id,
                        snapshot.status,
                        snapshot.screen,
                        if snapshot.open { "" } else { " (closed)" }
                    );
                }
            });

            let outcome = pending.outcome().await;
            drop(dialog);
            printer.abort();
            match outcome {
                ControlOutcome::Succeeded => println!("{action} succeeded"),
                ControlOutcome::Failed => println!("{action} failed; try again"),
                ControlOutcome::Cancelled => println!("{action} cancelled"),
            }

            if history {
                let entries = into_data(ui_bridge::control_history(state, 10).await)?;
                if json {
                    return print_json(&entries);
                }
                for e in &entries {
                    println!(
                        "{} {} {} {} by {}",
                        e.at.to_rfc3339(),
                        e.table_number,
                        e.action,
                        e.outcome,
                        e.actor.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match load_config() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.console.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = config_error {
        tracing::warn!("using default configuration: {e}");
    }

    let backend = connect(&BackendConfig::from_env());
    let state = AppState::start(backend, config).await;

    run(&state, cli.command, cli.json).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
