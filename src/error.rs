//! Unified application error types
//!
//! One taxonomy shared by the HTTP surface (rendered as JSON error bodies)
//! and the client (rebuilt from status codes and those bodies).

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::FieldErrors;
use crate::storage::StorageError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Operation on an id that does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad date range, empty name, unknown status, malformed batch
    #[error("validation failed: {0}")]
    ValidationFailed(FieldErrors),

    /// Missing or wrong bearer token
    #[error("unauthorized")]
    Unauthorized,

    /// Transport-level failure talking to the server
    #[error("network failure: {0}")]
    Network(String),

    /// Server answered with a 5xx or an unreadable body
    #[error("server failure ({status}): {message}")]
    Server { status: u16, message: String },

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Serializable error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Error code for client-side handling
    pub code: String,
    /// Per-field messages for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl AppError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Single-field validation failure
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::ValidationFailed(errors)
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Network(_) => "NETWORK_FAILURE",
            Self::Server { .. } => "SERVER_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status used when this error leaves the server
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Network(_) => StatusCode::BAD_GATEWAY,
            Self::Server { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the client should log and carry on rather than surface it
    ///
    /// Validation problems belong to the user; everything else on a toggle
    /// or reorder is drift that the next full refetch corrects.
    pub fn is_swallowable(&self) -> bool {
        !matches!(self, Self::ValidationFailed(_))
    }

    fn to_body(&self) -> ErrorResponse {
        let errors = match self {
            Self::ValidationFailed(errors) => Some(errors.clone()),
            _ => None,
        };
        ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            errors,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ProjectNotFound(id) => Self::NotFound(format!("Project {} not found", id)),
            StorageError::Validation(errors) => Self::ValidationFailed(errors),
            StorageError::InvalidInput(message) => Self::invalid("projects", message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonDataError(_) => "Invalid JSON data",
            JsonRejection::JsonSyntaxError(_) => "Invalid JSON syntax",
            JsonRejection::MissingJsonContentType(_) => {
                "Missing Content-Type: application/json header"
            }
            _ => "JSON parsing error",
        };
        Self::invalid("body", format!("{}: {}", message, rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid("path", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid("query", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.to_body())).into_response()
    }
}

/// Result alias used across handlers and client calls
pub type AppResult<T> = Result<T, AppError>;
