//! `WebSocket` push channel.
//!
//! Clients connect to `GET /echo` and receive the fixed target list as a
//! JSON text frame, then again after every push interval. The server never
//! reads from the socket. The loop ends on the first failed send (the
//! client went away) or when the process shuts down.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use jsonds_types::SEARCH_TARGETS;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` and start pushing.
///
/// A request that cannot be upgraded is logged and answered with the
/// extractor's rejection.
///
/// # Route
///
/// `GET /echo`
pub async fn echo(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(error = %rejection, "upgrade");
            return rejection.into_response();
        }
    };

    let interval = state.push_interval;
    let shutdown = state.shutdown.clone();
    let clients = Arc::clone(&state.push_clients);
    ws.on_failed_upgrade(|e| warn!(error = %e, "upgrade"))
        .on_upgrade(move |socket| push_loop(socket, interval, shutdown, clients))
}

/// Counts a connection as live until the push loop returns.
struct ClientGuard(Arc<AtomicUsize>);

impl ClientGuard {
    fn register(clients: Arc<AtomicUsize>) -> Self {
        clients.fetch_add(1, Ordering::Relaxed);
        Self(clients)
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Push the target list every `interval` until a send fails or `shutdown`
/// fires.
async fn push_loop(
    mut socket: WebSocket,
    interval: Duration,
    shutdown: CancellationToken,
    clients: Arc<AtomicUsize>,
) {
    let _guard = ClientGuard::register(clients);
    let payload: Utf8Bytes = match serde_json::to_string(&SEARCH_TARGETS) {
        Ok(json) => json.into(),
        Err(e) => {
            warn!("Failed to serialize push payload: {e}");
            return;
        }
    };

    debug!("Push client connected");

    loop {
        if let Err(e) = socket.send(Message::Text(payload.clone())).await {
            debug!(error = %e, "Push client disconnected (send failed)");
            return;
        }

        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("Shutdown requested, closing push connection");
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
            () = tokio::time::sleep(interval) => {}
        }
    }
}
