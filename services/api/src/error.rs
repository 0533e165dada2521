//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how it is
//! rendered for any failure that is not a request-shape violation.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use vivamate_core::PortError;

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

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be read or decoded at all.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The request body is larger than the service accepts.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The caller is not authenticated or presented bad credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Port(PortError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Port(PortError::Unauthorized) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to clients. Internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::MalformedRequest(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::Port(PortError::NotFound(msg)) | ApiError::Port(PortError::Conflict(msg)) => {
                msg.clone()
            }
            ApiError::Port(PortError::Unauthorized) => "Unauthorized".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_http_statuses() {
        assert_eq!(
            ApiError::from(PortError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PortError::Conflict("x".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(PortError::Unexpected("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn oversized_payloads_are_not_bad_requests() {
        let err = ApiError::PayloadTooLarge("Request body exceeds 1048576 bytes".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.public_message(), "Request body exceeds 1048576 bytes");
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = ApiError::from(PortError::Unexpected("connection reset by peer".into()));
        assert_eq!(err.public_message(), "Internal server error");
    }
}
