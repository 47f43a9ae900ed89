//! API error payloads and status-code mapping.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::{Deserialize, Serialize};
use taskboard_core::{ServiceError, ValidationError};

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Stable code for programmatic handling.
    pub code: String,
    /// Human-readable reason.
    pub message: String,
}

/// Status code plus error body.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub error: ApiError,
}

impl ApiErrorResponse {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ApiError {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn validation(err: &ValidationError) -> Self {
        Self::bad_request("VALIDATION_ERROR", err.reason())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Details stay in the log, never in the response.
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<ServiceError> for ApiErrorResponse {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(reason) => Self::validation(&reason),
            ServiceError::TaskNotFound(id) => Self::not_found(format!("Task not found with id: {id}")),
            ServiceError::UserNotFound(id) => Self::not_found(format!("User not found with id: {id}")),
            ServiceError::Repo(repo_err) => {
                error!("event=storage_failure module=http status=error error={repo_err}");
                Self::internal_error()
            }
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("INVALID_BODY", rejection.body_text())
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request("INVALID_PATH", rejection.body_text())
    }
}
