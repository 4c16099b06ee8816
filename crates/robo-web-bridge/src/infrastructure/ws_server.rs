//! WebSocket server: accept loop and per-session task management.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming TCP connections from browsers.
//! 3. Upgrading each connection to a WebSocket session.
//! 4. Running each session as two halves:
//!    - **Reader**: parses JSON requests and hands them to the session's
//!      [`BridgeSession`], queueing each reply.
//!    - **Writer**: drains the outbound queue (replies and control updates)
//!      into WebSocket text frames and sends a ping every `ping_interval`.
//! 5. Gracefully shutting down when the `running` flag is cleared.
//!
//! Replies and dialog updates share one queue, so the browser receives them
//! in the order they were produced.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use robo_console::infrastructure::ui_bridge::AppState;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::{parse_request, BridgeSession};
use crate::domain::config::BridgeConfig;
use crate::domain::messages::ServerMsg;

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the WebSocket accept loop until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use or the process lacks permission to bind).
pub async fn run_server(
    config: BridgeConfig,
    state: Arc<AppState>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.ws_bind_addr)
        .await
        .with_context(|| {
            format!(
                "failed to bind WebSocket listener on {}",
                config.ws_bind_addr
            )
        })?;

    info!("WebSocket bridge listening on {}", config.ws_bind_addr);
    serve(listener, config, state, running).await;
    Ok(())
}

/// Accepts browsers on an already-bound listener until `running` is cleared.
///
/// Every session shares `state`, so all browsers contend for the same control
/// lock and see one control history.  Sign-in and the tablet list are kept
/// per session.
pub async fn serve(
    listener: TcpListener,
    config: BridgeConfig,
    state: Arc<AppState>,
    running: Arc<AtomicBool>,
) {
    let config = Arc::new(config);

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Short timeout so the `running` flag is checked even when idle.
        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                info!("new browser connection from {peer_addr}");
                let cfg = Arc::clone(&config);
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    handle_browser_session(stream, peer_addr, cfg, state).await;
                });
            }
            Ok(Err(e)) => {
                error!("accept error: {e}");
            }
            Err(_) => {
                // No connection in the last 200 ms.
            }
        }
    }
}

// ── Per-session handler ───────────────────────────────────────────────────────

async fn handle_browser_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<BridgeConfig>,
    state: Arc<AppState>,
) {
    match run_session(raw_stream, peer_addr, config, state).await {
        Ok(()) => info!("session {peer_addr} closed normally"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs one browser session from handshake to disconnect.
///
/// # Errors
///
/// Returns an error if the WebSocket handshake fails.
async fn run_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<BridgeConfig>,
    state: Arc<AppState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    let session_id = Uuid::new_v4().simple().to_string();
    info!("WebSocket session {session_id} established with {peer_addr}");

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMsg>(config.outbound_queue.max(1));
    let mut session = BridgeSession::new(state, out_tx.clone());

    // ── Writer: outbound queue and keepalive → browser ────────────────────────
    let session_id_w = session_id.clone();
    let ping_interval = config.ping_interval;
    let mut writer = tokio::spawn(async move {
        let mut ticker = interval(ping_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // Skip the immediate first tick.

        loop {
            tokio::select! {
                msg = out_rx.recv() => {
                    let Some(msg) = msg else { break };
                    let text = match serde_json::to_string(&msg) {
                        Ok(text) => text,
                        Err(e) => {
                            error!("session {session_id_w}: JSON serialization error: {e}");
                            continue;
                        }
                    };
                    if ws_tx.send(WsMessage::Text(text)).await.is_err() {
                        debug!("session {session_id_w}: WebSocket send failed (browser disconnected)");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if ws_tx.send(WsMessage::Ping(Vec::new())).await.is_err() {
                        debug!("session {session_id_w}: keepalive ping failed");
                        break;
                    }
                }
            }
        }
    });

    // ── Reader: browser → session ─────────────────────────────────────────────
    let reader = async {
        loop {
            let ws_msg = match ws_rx.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                    debug!("session {session_id}: browser WebSocket closed normally");
                    break;
                }
                Some(Err(e)) => {
                    warn!("session {session_id}: browser WebSocket error: {e}");
                    break;
                }
                None => {
                    debug!("session {session_id}: browser stream ended");
                    break;
                }
            };

            let reply = match ws_msg {
                WsMessage::Text(text) => match parse_request(&text) {
                    Ok(request) => {
                        debug!("session {session_id}: browser → bridge: {}", request.name());
                        session.handle(request).await
                    }
                    Err(e) => {
                        warn!("session {session_id}: {e}");
                        ServerMsg::Error {
                            message: e.to_string(),
                        }
                    }
                },
                WsMessage::Binary(_) => {
                    warn!("session {session_id}: unexpected binary WebSocket frame (ignored)");
                    continue;
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
                WsMessage::Close(_) => {
                    debug!("session {session_id}: WebSocket Close frame received");
                    break;
                }
            };

            if out_tx.send(reply).await.is_err() {
                break;
            }
        }
    };

    tokio::select! {
        _ = &mut writer => {
            debug!("session {session_id}: writer task ended");
        }
        _ = reader => {
            debug!("session {session_id}: reader ended");
        }
    }

    session.end().await;
    writer.abort();
    Ok(())
}
