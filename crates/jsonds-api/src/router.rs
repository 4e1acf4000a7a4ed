//! Axum router construction for the datasource API.
//!
//! Assembles all routes (HTTP + `WebSocket`) into a single [`Router`]
//! with permissive CORS, request tracing, and a per-request deadline.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{MethodRouter, any, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::push;
use crate::state::AppState;

/// `OPTIONS` + `POST`, everything else rejected with the fixed message.
fn data_endpoint<H, T>(handler: H) -> MethodRouter<Arc<AppState>>
where
    H: axum::handler::Handler<T, Arc<AppState>>,
    T: 'static,
{
    post(handler)
        .options(handlers::preflight)
        .fallback(handlers::bad_method)
}

/// Build the complete Axum router for the datasource server.
///
/// The router includes:
/// - `ANY /` -- health check
/// - `OPTIONS|POST /search` -- target names
/// - `OPTIONS|POST /query` -- fixture time series
/// - `OPTIONS|POST /annotations` -- events in a time window
/// - `GET /echo` -- `WebSocket` push channel
///
/// CORS allows any origin so a browser-side front-end can call the
/// datasource directly.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/", any(handlers::root))
        // Datasource protocol
        .route("/search", data_endpoint(handlers::search))
        .route("/query", data_endpoint(handlers::query))
        .route("/annotations", data_endpoint(handlers::annotations))
        // WebSocket
        .route("/echo", get(push::echo))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.request_timeout,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
