//! Error types for the session service and its API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use packeval_types::{EvaluationId, Step};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Session-boundary errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No session with the given id
    #[error("evaluation '{0}' not found")]
    NotFound(EvaluationId),

    /// The driver halted the session before a suspension point
    #[error("evaluation '{id}' halted at step '{step}': {reason}")]
    Halted {
        id: EvaluationId,
        step: Step,
        reason: String,
        /// Whether the checkpoint was kept and may be retried
        retryable: bool,
    },
}

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// API-facing errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A collaborator failed; the session is still resumable
    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(id) => ApiError::NotFound(id.to_string()),
            ServiceError::Halted { retryable: true, .. } => ApiError::Upstream(err.to_string()),
            ServiceError::Halted { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", None),
            ApiError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_FAILURE",
                Some(json!({ "retryable": true })),
            ),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
