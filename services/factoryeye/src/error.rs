//! Error types for the FactoryEYE service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Errors that can occur in the FactoryEYE service
#[derive(Debug, thiserror::Error)]
pub enum FactoryEyeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server returned status {status} for {url}")]
    Server { status: u16, url: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl FactoryEyeError {
    /// Whether the failure may go away on the next poll
    pub fn is_transient(&self) -> bool {
        match self {
            FactoryEyeError::Network(_) | FactoryEyeError::Timeout(_) => true,
            FactoryEyeError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            FactoryEyeError::Validation(_) => StatusCode::BAD_REQUEST,
            FactoryEyeError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            FactoryEyeError::Forbidden(_) => StatusCode::FORBIDDEN,
            FactoryEyeError::NotFound(_) => StatusCode::NOT_FOUND,
            FactoryEyeError::Network(_)
            | FactoryEyeError::Timeout(_)
            | FactoryEyeError::Server { .. }
            | FactoryEyeError::Decode(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FactoryEyeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias for FactoryEYE operations
pub type Result<T> = std::result::Result<T, FactoryEyeError>;
