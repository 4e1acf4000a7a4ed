//! `jsonds` binary: a mock datasource for dashboard front-ends.
//!
//! Wires together the event log, the seeder, the background generator and
//! the datasource API server.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `jsonds.yaml` (or `JSONDS_CONFIG`)
//! 2. Initialize structured logging (tracing, text or JSON lines)
//! 3. Create the event store and seed it with historical events
//! 4. Spawn the event generator
//! 5. Bind the listener and serve until Ctrl-C / SIGTERM
//! 6. Cancel the generator and wait for both tasks to finish
//!
//! Seeding completes before the listener is bound, so the first request
//! already sees the full backlog.

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use jsonds_api::server::ServerConfig;
use jsonds_api::state::AppState;
use jsonds_core::config::{JsondsConfig, LogFormat, LoggingConfig};
use jsonds_core::{EventStore, Generator, seeder};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServerBinError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "jsonds.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the listener cannot be
/// bound, or the server stops with a fatal error.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);

    info!(
        host = %config.server.host,
        port = config.server.port,
        seed_count = config.events.seed_count,
        generate_interval_ms = config.events.generate_interval_ms,
        push_interval_ms = config.push.interval_ms,
        request_timeout_ms = config.server.request_timeout_ms,
        "jsonds starting"
    );

    run(config).await?;

    info!("jsonds shutdown complete");
    Ok(())
}

/// Seed, spawn the generator, and serve until shutdown.
async fn run(config: JsondsConfig) -> Result<(), ServerBinError> {
    let shutdown = CancellationToken::new();

    // 3. Event store + backlog.
    let store = Arc::new(EventStore::new());
    seeder::seed_now(&store, config.events.seed_count).await;

    // 4. Background generator.
    let generator = Generator::new(Arc::clone(&store), config.events.generate_interval())
        .spawn(shutdown.clone());

    // 5. Datasource server.
    let state = Arc::new(AppState::from_config(
        Arc::clone(&store),
        &config,
        shutdown.clone(),
    ));
    let server_config = ServerConfig::from(&config.server);
    let running = match jsonds_api::spawn_server(&server_config, state).await {
        Ok(running) => running,
        Err(e) => {
            shutdown.cancel();
            return Err(e.into());
        }
    };
    info!(addr = %running.local_addr, "Datasource API started");

    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let served = running.handle.await;

    // 6. The server may also stop on its own after a fatal error.
    shutdown.cancel();
    match generator.await {
        Ok(appended) => info!(appended, total = store.len().await, "Event generator joined"),
        Err(e) => warn!(error = %e, "Event generator task failed"),
    }

    match served {
        Ok(result) => result.map_err(ServerBinError::from),
        Err(e) => Err(ServerBinError::Task {
            message: format!("server task: {e}"),
        }),
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the configuration file, falling back to defaults when absent.
///
/// The path comes from `JSONDS_CONFIG` when set, otherwise
/// [`DEFAULT_CONFIG_PATH`]. A missing default file is not an error; a
/// missing file named explicitly is.
fn load_config() -> Result<JsondsConfig, ServerBinError> {
    if let Ok(path) = std::env::var("JSONDS_CONFIG") {
        return Ok(JsondsConfig::from_file(&PathBuf::from(path))?);
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        Ok(JsondsConfig::from_file(&path)?)
    } else {
        Ok(JsondsConfig::from_env_only()?)
    }
}

/// Cancel `shutdown` on Ctrl-C, or SIGTERM on unix.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C"),
        () = terminate => info!("Received SIGTERM"),
        () = shutdown.cancelled() => return,
    }

    shutdown.cancel();
}
