use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Bridge error types
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transient backend fault: {0}")]
    Transient(String),

    #[error("Patient not found")]
    NotFound,

    #[error("Backend returned error status {0}: {1}")]
    Backend(u16, String),

    #[error("Service temporarily unavailable due to repeated backend failures (circuit breaker open)")]
    CircuitOpen,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl BridgeError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BridgeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // A transient fault that survived the retry loop means the
            // backend is unreachable.
            BridgeError::Transient(_) => StatusCode::BAD_GATEWAY,
            BridgeError::NotFound => StatusCode::NOT_FOUND,
            // The backend's own error status passes through to the caller.
            BridgeError::Backend(code, _) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            BridgeError::CircuitOpen => StatusCode::SERVICE_UNAVAILABLE,
            BridgeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BridgeError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this fault is retryable (connection/timeout-class only)
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::Transient(_))
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
