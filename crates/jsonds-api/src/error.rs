//! Error types for the datasource API.
//!
//! [`ApiError`] covers the request-scoped failures a client can cause. It
//! converts into a `400 Bad Request` with a plain-text body via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Body sent when a data endpoint is called with an unsupported verb.
pub const BAD_METHOD_MESSAGE: &str = "bad method; supported OPTIONS, POST";

/// Errors that can occur while handling a single request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request used a verb other than `OPTIONS` or `POST`.
    #[error("bad method; supported OPTIONS, POST")]
    BadMethod,

    /// The request body is not the expected JSON shape.
    #[error("json decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_method_message_is_exact() {
        assert_eq!(ApiError::BadMethod.to_string(), BAD_METHOD_MESSAGE);
    }

    #[test]
    fn decode_error_carries_detail() {
        let err = serde_json::from_str::<serde_json::Value>("{").map(|_| ());
        let Err(source) = err else {
            return;
        };
        let message = ApiError::from(source).to_string();
        assert!(message.starts_with("json decode failure: "));
        assert!(message.contains("EOF"));
    }

    #[test]
    fn errors_map_to_bad_request() {
        let response = ApiError::BadMethod.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
