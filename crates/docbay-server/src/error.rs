//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for request handlers
pub type ApiResult<T> = std::result::Result<T, AppError>;

/// Application error taxonomy.
///
/// Every guard failure in the ingestion subsystem maps onto one of these
/// variants; the HTTP layer translates them into status codes. Nothing is
/// retried internally and nothing is swallowed.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Retry budget exhausted: {0}")]
    RetryBudgetExhausted(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "A database error occurred".to_string())
            },
            AppError::NotFound(ref message) => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Unauthorized(ref message) => (StatusCode::UNAUTHORIZED, message.clone()),
            AppError::Forbidden(ref message) => (StatusCode::FORBIDDEN, message.clone()),
            AppError::InvalidTransition(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::RetryBudgetExhausted(ref message) => {
                (StatusCode::BAD_REQUEST, message.clone())
            },
            AppError::Conflict(ref message) => (StatusCode::CONFLICT, message.clone()),
            AppError::Validation(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::BadRequest(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Config(ref message) => {
                tracing::error!("Configuration error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            },
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            },
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<crate::features::ingestion::state_machine::TransitionError> for AppError {
    fn from(err: crate::features::ingestion::state_machine::TransitionError) -> Self {
        use crate::features::ingestion::state_machine::TransitionError;
        match err {
            TransitionError::NotFound => AppError::NotFound("Ingestion job not found".to_string()),
            TransitionError::Forbidden => {
                AppError::Forbidden("Not allowed to modify this ingestion job".to_string())
            },
            TransitionError::InvalidTransition { .. } => AppError::InvalidTransition(err.to_string()),
            TransitionError::RetryBudgetExhausted { .. } => {
                AppError::RetryBudgetExhausted(err.to_string())
            },
        }
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::Sqlx(e) => AppError::Database(e),
            crate::db::DbError::Config(msg) => AppError::Config(msg),
            crate::db::DbError::Corrupt(msg) => {
                tracing::error!("Corrupt database record: {}", msg);
                AppError::Internal("Corrupt database record".to_string())
            },
        }
    }
}
