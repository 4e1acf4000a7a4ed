//! Request handlers for the datasource endpoints.
//!
//! The three data endpoints share one discipline: `OPTIONS` answers an
//! empty `200`, `POST` decodes the body as JSON whatever its content type,
//! and every other verb gets [`ApiError::BadMethod`]. Responses are encoded
//! as JSON followed by a newline.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | any | `/` | Health check, always `ok` |
//! | `POST` | `/search` | Fixed list of target names |
//! | `POST` | `/query` | Fixture time series |
//! | `POST` | `/annotations` | Stored events inside the requested window |

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use jsonds_types::{AnnotationResponse, AnnotationsReq, QueryReq, SearchReq, TimeSeries};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

/// Log the path and method of a request on entry.
fn log_entry(method: &Method, uri: &Uri) {
    debug!(path = %uri.path(), %method, "request");
}

/// Decode a request body, mapping failures to a client error.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Rejected request body");
        ApiError::Decode(e)
    })
}

/// Encode `value` as a JSON response.
///
/// An encode failure is logged and answered with an empty `200`; the
/// client never sees an error status for it.
pub(crate) fn encode_json<T: Serialize + ?Sized>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(mut body) => {
            body.push(b'\n');
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            error!(error = %e, "json enc");
            StatusCode::OK.into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Method discipline
// ---------------------------------------------------------------------------

/// Answer a pre-flight `OPTIONS` request with an empty `200`.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Reject any verb other than `OPTIONS` and `POST` on a data endpoint.
pub async fn bad_method(method: Method, uri: Uri) -> ApiError {
    log_entry(&method, &uri);
    ApiError::BadMethod
}

// ---------------------------------------------------------------------------
// ANY / -- health check
// ---------------------------------------------------------------------------

/// Report the server as healthy.
///
/// Exists so the datasource can be added in the front-end: without it the
/// "test connection" step reports an unknown error.
pub async fn root(method: Method, uri: Uri) -> &'static str {
    log_entry(&method, &uri);
    "ok\n"
}

// ---------------------------------------------------------------------------
// POST /search
// ---------------------------------------------------------------------------

/// Return the fixed list of queryable targets.
///
/// The request body must parse as a [`SearchReq`] but its content does not
/// narrow the result.
pub async fn search(method: Method, uri: Uri, body: Bytes) -> Result<Response, ApiError> {
    log_entry(&method, &uri);
    let req: SearchReq = decode(&body)?;
    debug!(target_text = %req.target, "search");
    Ok(encode_json(&jsonds_types::SEARCH_TARGETS))
}

// ---------------------------------------------------------------------------
// POST /query
// ---------------------------------------------------------------------------

/// Return the fixture time series.
///
/// The range and targets are validated but not used: every query gets the
/// same series named `abc`, anchored at the current time.
pub async fn query(method: Method, uri: Uri, body: Bytes) -> Result<Response, ApiError> {
    log_entry(&method, &uri);
    let req: QueryReq = decode(&body)?;
    debug!(
        panel_id = req.panel_id,
        targets = req.targets.len(),
        "query"
    );
    Ok(encode_json(&[TimeSeries::fixture(Utc::now())]))
}

// ---------------------------------------------------------------------------
// POST /annotations
// ---------------------------------------------------------------------------

/// Return every stored event strictly inside the requested window.
///
/// Each event carries the caller's annotation back with `showLine` forced
/// on. A window that matches nothing yields `[]`.
pub async fn annotations(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Response, ApiError> {
    log_entry(&method, &uri);
    let req: AnnotationsReq = decode(&body)?;

    let events = state
        .store
        .query_range(req.range.start_millis(), req.range.end_millis())
        .await;

    let decorated: Vec<AnnotationResponse> = events
        .iter()
        .map(|event| AnnotationResponse::decorate(&req.annotation, event))
        .collect();

    debug!(
        annotation = %req.annotation.name,
        matched = decorated.len(),
        "annotations"
    );
    Ok(encode_json(&decorated))
}
