//! Application error types for seasonwatch.
//!
//! Provides a unified error type that implements `IntoResponse` for Axum.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate unique key on insert
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation on an absent id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Outbound call to TMDB or Jellyfin failed
    #[error("Upstream error from {target}: {message}")]
    Upstream {
        /// The call that failed, e.g. `tmdb /tv/42`.
        target: String,
        /// HTTP status returned by the upstream, `None` for transport failures.
        status: Option<u16>,
        message: String,
    },

    /// Database setup errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// SQLite-specific errors (for direct rusqlite usage)
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration loading/parsing errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build an upstream error for a call that never produced a status.
    pub fn upstream(target: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            target: target.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Build an upstream error for a non-success HTTP status.
    pub fn upstream_status(target: impl Into<String>, status: u16) -> Self {
        AppError::Upstream {
            target: target.into(),
            status: Some(status),
            message: format!("returned status {}", status),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", Some(msg.clone())),
            AppError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "not_found", Some(resource.clone()))
            }
            AppError::Upstream {
                target,
                status,
                message,
            } => {
                tracing::warn!(call = %target, status = ?status, "Upstream error: {}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    Some(format!("{} failed: {}", target, message)),
                )
            }
            AppError::Database(e) => {
                // Log full error details but don't expose to client
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Sqlite(e) => {
                tracing::error!("SQLite error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
