//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! rendered to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medsum_core::ports::PortError;
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;
use crate::web::session::AuthError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or missing client input. The message is shown to the client.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    /// Absent, or owned by someone else. The two are never told apart.
    #[error("not found")]
    NotFound,

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Port(PortError::Invalid(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) | ApiError::Port(PortError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound | ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to hand to the client.
    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::Port(PortError::Invalid(msg)) => msg.clone(),
            ApiError::Unauthorized(e) => e.to_string(),
            ApiError::Port(PortError::Unauthorized) => "unauthorized".to_string(),
            ApiError::NotFound | ApiError::Port(PortError::NotFound(_)) => "not found".to_string(),
            _ => "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
        }
        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}
