//! Shared application state for the datasource API server.
//!
//! [`AppState`] holds a handle on the event store, the settings handlers
//! need at request time, and the process-wide shutdown token that stops
//! push loops and the listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use jsonds_core::EventStore;
use jsonds_core::config::JsondsConfig;
use tokio_util::sync::CancellationToken;

/// Default pause between two pushes on the echo socket.
pub const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_secs(3);

/// Default deadline for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The annotation event log.
    pub store: Arc<EventStore>,
    /// Pause between two pushes on one echo connection.
    pub push_interval: Duration,
    /// Deadline applied to every HTTP request.
    pub request_timeout: Duration,
    /// Process-wide shutdown signal.
    pub shutdown: CancellationToken,
    /// Number of echo connections whose push loop is still running.
    pub push_clients: Arc<AtomicUsize>,
}

impl AppState {
    /// Create state around `store` with default timings and a fresh token.
    pub fn new(store: Arc<EventStore>) -> Self {
        Self {
            store,
            push_interval: DEFAULT_PUSH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown: CancellationToken::new(),
            push_clients: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create state around `store` using the timings from `config`.
    pub fn from_config(
        store: Arc<EventStore>,
        config: &JsondsConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            push_interval: config.push.interval(),
            request_timeout: config.server.request_timeout(),
            shutdown,
            push_clients: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the push cadence.
    #[must_use]
    pub const fn with_push_interval(mut self, interval: Duration) -> Self {
        self.push_interval = interval;
        self
    }

    /// Replace the per-request deadline.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Number of echo connections currently being pushed to.
    pub fn push_clients(&self) -> usize {
        self.push_clients.load(Ordering::Relaxed)
    }

    /// Replace the shutdown token.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }
}
