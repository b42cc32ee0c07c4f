//! Mapping of registry errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};

use crate::error::Error;

/// Error returned by HTTP handlers.
///
/// Renders as `{"error": "..."}` with a status code chosen by error kind.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code and client-facing message for this error.
    ///
    /// Server-side failures get a generic message; the detail is logged.
    #[must_use]
    pub fn status_and_message(&self) -> (StatusCode, String) {
        let err = &self.0;
        if matches!(err, Error::NotFound { .. }) {
            (StatusCode::NOT_FOUND, "Donor not found.".to_string())
        } else if err.is_client_error() {
            (StatusCode::BAD_REQUEST, err.to_string())
        } else if err.is_persistence_error() {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save donor data.".to_string(),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            debug!("Rejected request: {}", self.0);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
