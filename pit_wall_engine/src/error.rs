use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::source::{FetchError, SourceError};

/// Failures that end a request. Client data problems map to 400, session
/// loading problems to 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Driver(#[from] FetchError),

    #[error("Driver {driver} has {count} usable telemetry samples on the fastest lap, at least 2 are required.")]
    InsufficientTelemetry { driver: String, count: usize },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Driver(_) | ApiError::InsufficientTelemetry { .. } => StatusCode::BAD_REQUEST,
            ApiError::Source(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client as `detail`.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Source(e) => format!("Internal Server Error: {}", e.public_message()),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::info!("rejected request: {}", self);
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
