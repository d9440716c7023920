//! # API Error Types
//!
//! Unified error handling for the REST layer.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use medlift_domain::DomainError;
use medlift_persistence::PersistenceError;
use thiserror::Error;

/// API-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Persistence(PersistenceError),

    #[error("An item in the bulk is not properly defined: {0}")]
    InvalidBulkItem(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Domain(inner) => Self::Domain(inner),
            other => Self::Persistence(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidPayload(rejection.body_text())
    }
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Domain(err) | Self::Persistence(PersistenceError::Domain(err)) => match err {
                DomainError::InvalidInputFormat { .. } | DomainError::UnmetConditions(_) => {
                    StatusCode::BAD_REQUEST
                }
                DomainError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::Conflict(_) => StatusCode::CONFLICT,
                DomainError::CapacityExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                DomainError::RequestProcessing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Persistence(PersistenceError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Persistence(PersistenceError::Duplicate { .. })
            | Self::InvalidBulkItem(_)
            | Self::MissingFields(_)
            | Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::Persistence(PersistenceError::WriteConflict(_)) => StatusCode::CONFLICT,
        }
    }

    /// Get machine-readable error code
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(err) | Self::Persistence(PersistenceError::Domain(err)) => err.code(),
            Self::Persistence(PersistenceError::NotFound { .. }) => "NOT_FOUND",
            Self::Persistence(PersistenceError::Duplicate { .. }) => "DUPLICATE",
            Self::Persistence(PersistenceError::WriteConflict(_)) => "WRITE_CONFLICT",
            Self::InvalidBulkItem(_) => "INVALID_BULK_ITEM",
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Request failed");
        }

        let body = serde_json::json!({
            "error": {
                "message": self.to_string(),
                "code": self.error_code(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
