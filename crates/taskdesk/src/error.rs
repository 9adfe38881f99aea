//! HTTP error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tasks::TasksError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Tasks(#[from] TasksError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or malformed Authorization header")]
    MissingToken,

    #[error("Failed to extract tasks")]
    Extraction,

    #[error("Request body is too large")]
    PayloadTooLarge,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::Extraction => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Tasks(err) => match err {
                TasksError::Validation { .. }
                | TasksError::InvalidStatus { .. }
                | TasksError::InvalidPriority { .. }
                | TasksError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
                TasksError::TaskNotFound { .. } => StatusCode::NOT_FOUND,
                TasksError::Unauthorized | TasksError::Auth { .. } => StatusCode::UNAUTHORIZED,
                TasksError::Provider { .. } => StatusCode::BAD_GATEWAY,
                TasksError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
                TasksError::Ai(_) | TasksError::JsonParseError { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Text shown to the caller.
    fn public_message(&self) -> String {
        match self {
            Self::Tasks(TasksError::Provider { service, .. }) => {
                format!("Request to {service} failed, please try again")
            }
            Self::Tasks(TasksError::Ai(_) | TasksError::JsonParseError { .. }) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "Request failed");
        } else {
            warn!(error = %self, %status, "Request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
