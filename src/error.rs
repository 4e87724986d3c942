//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use crate::gate::conflict::Conflict;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate claim: {0}")]
    DuplicateClaim(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Import parse error: {0}")]
    ImportParse(String),

    #[error("Import blocked by {} unresolved conflict(s)", .0.len())]
    ImportBlocked(Vec<Conflict>),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Structured conflicts, present only on import-blocked responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<Conflict>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, conflicts) = match self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None)
            }
            AppError::DuplicateClaim(msg) => {
                (StatusCode::BAD_REQUEST, "DUPLICATE_CLAIM", msg, None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::ImportParse(msg) => {
                (StatusCode::BAD_REQUEST, "IMPORT_PARSE_ERROR", msg, None)
            }
            AppError::ImportBlocked(conflicts) => (
                StatusCode::CONFLICT,
                "IMPORT_BLOCKED",
                format!(
                    "Import blocked by {} unresolved conflict(s)",
                    conflicts.len()
                ),
                Some(conflicts),
            ),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            AppError::Config(msg) => {
                error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    "A configuration error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            code: Some(error_code.to_string()),
            conflicts,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;
