//! Server startup helper for the `jsonds` binary.
//!
//! Provides [`spawn_server`] which binds the listener eagerly and then
//! runs the datasource server on a background Tokio task. Binding before
//! spawning means a bad address or a port in use is reported to the
//! caller instead of being logged from inside the task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use jsonds_api::{AppState, ServerConfig, spawn_server};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(store));
//! let running = spawn_server(&ServerConfig::default(), state).await?;
//! running.handle.await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, bind, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the datasource server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A server running on a background task.
#[derive(Debug)]
pub struct RunningServer {
    /// The address actually bound (resolves port `0`).
    pub local_addr: SocketAddr,
    /// Completes once the server has shut down.
    pub handle: JoinHandle<Result<(), ServerError>>,
}

/// Bind the listener and spawn the server on a background task.
///
/// The server runs until the shutdown token in `state` is cancelled. The
/// caller should hold the returned handle and await it during shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot be bound.
pub async fn spawn_server(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<RunningServer, StartupError> {
    let listener = bind(config).await?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(serve(listener, state));

    tracing::info!(%local_addr, "Datasource server spawned on background task");

    Ok(RunningServer { local_addr, handle })
}
