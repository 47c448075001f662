//! API error types and response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error type.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (validation error, invalid input, rejected SQL).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (missing or invalid authentication).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Conflict (e.g., duplicate resource).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Semantic validation failure.
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// The external translation service failed.
    #[error("Upstream service error: {0}")]
    UpstreamService(String),

    /// Invalid login credentials.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Session expired.
    #[error("Session expired")]
    SessionExpired,
}

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UpstreamService(_) => StatusCode::BAD_GATEWAY,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::SessionExpired => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity(_) => "UNPROCESSABLE_ENTITY",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::UpstreamService(_) => "UPSTREAM_SERVICE_ERROR",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::SessionExpired => "SESSION_EXPIRED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ts_core::db::DbError> for ApiError {
    fn from(err: ts_core::db::DbError) -> Self {
        match err {
            ts_core::db::DbError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} '{}' not found", entity, id))
            }
            ts_core::db::DbError::Constraint(msg) => ApiError::Conflict(msg),
            err => ApiError::Database(err.to_string()),
        }
    }
}

impl From<ts_core::NlqError> for ApiError {
    fn from(err: ts_core::NlqError) -> Self {
        match err {
            ts_core::NlqError::Rejected(msg) => {
                ApiError::BadRequest(format!("Generated SQL rejected: {}", msg))
            }
            ts_core::NlqError::Db(db) => db.into(),
            err => ApiError::UpstreamService(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

impl From<ts_core::PasswordError> for ApiError {
    fn from(err: ts_core::PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::UpstreamService("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_lookup_miss_maps_to_not_found() {
        let err: ApiError = ts_core::db::DbError::not_found("incident type", "Cryptojacking").into();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(err.to_string().contains("Cryptojacking"));
    }

    #[test]
    fn test_rejected_sql_maps_to_bad_request() {
        let err: ApiError = ts_core::NlqError::Rejected("forbidden keyword 'drop'".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
