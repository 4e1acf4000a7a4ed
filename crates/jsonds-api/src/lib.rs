//! Datasource API server for jsonds.
//!
//! This crate provides an Axum HTTP server speaking the simple-JSON
//! datasource protocol:
//!
//! - **Health check** (`/`) so the front-end's "test connection" succeeds
//! - **Search** (`POST /search`) returning a fixed list of target names
//! - **Query** (`POST /query`) returning a fixture time series
//! - **Annotations** (`POST /annotations`) returning events from the
//!   in-memory [`EventStore`] that fall inside the requested window
//! - **Push channel** (`GET /echo`) a `WebSocket` that receives the fixed
//!   target list on a fixed cadence
//!
//! # Architecture
//!
//! Handlers share nothing but the [`AppState`]: a handle on the event
//! store, the push cadence, and the process-wide shutdown token. The store
//! lock is released before any response is encoded.
//!
//! [`EventStore`]: jsonds_core::EventStore

pub mod error;
pub mod handlers;
pub mod push;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::{RunningServer, StartupError, spawn_server};
pub use state::AppState;
