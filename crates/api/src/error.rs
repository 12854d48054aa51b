//! API error types
//!
//! Provides structured error responses for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use tutor_analytics::AnalyticsError;
use tutor_auth::AuthError;
use tutor_store::StoreError;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request parameters
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication required or rejected
    #[error("{0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Write refused because the target already exists
    ///
    /// Reported as 400 with a message; the stored value is left unchanged.
    #[error("{0}")]
    Conflict(String),

    /// Validation error
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A required backing service is down
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    // Helper constructors

    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            StoreError::Invalid { field, message } => Self::validation(field, message),
            StoreError::Database(_) | StoreError::Json(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation { field, message } => Self::validation(field, message),
            AuthError::Cache(_) => Self::Unavailable(err.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::PhoneTaken => Self::Conflict(err.to_string()),
            AuthError::UserNotFound => Self::NotFound(err.to_string()),
            AuthError::Store(store) => store.into(),
            _ if err.is_token_error() => Self::Unauthorized(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::OutOfRange(msg) => Self::validation("limit", msg),
            AnalyticsError::Store(store) => store.into(),
        }
    }
}

/// One invalid field
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code (machine-readable)
    pub error: &'static str,
    /// Error message (human-readable)
    pub message: String,
    /// Per-field details for validation errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let fields = match &self {
            Self::Validation { field, message } => vec![FieldError {
                field: field.clone(),
                message: message.clone(),
            }],
            _ => Vec::new(),
        };
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            fields,
        };

        tracing::warn!(
            error_code = body.error,
            error_message = %body.message,
            status = %status,
            "API error"
        );

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        let cases = [
            (StoreError::not_found("lesson", 1), StatusCode::NOT_FOUND),
            (
                StoreError::already_exists("feedback", "u1/1"),
                StatusCode::BAD_REQUEST,
            ),
            (
                StoreError::invalid("rating", "out of range"),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_auth_errors_map_to_status() {
        assert_eq!(
            ApiError::from(AuthError::cache("down")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(AuthError::TokenExpired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::validation("phone_number", "bad")).code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            ApiError::from(AuthError::UserNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
