/// Unified error types for the Gridpoint portal
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the portal backend
#[derive(Error, Debug)]
pub enum PortalError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Authentication errors (bad credentials, bad token)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authorization errors (insufficient role or ownership)
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Account locked out after repeated failed logins
    #[error("Account is locked")]
    AccountLocked,

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after: std::time::Duration },

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert PortalError to HTTP response
impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            PortalError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationFailed",
                self.to_string(),
            ),
            PortalError::Authorization(_) => {
                (StatusCode::FORBIDDEN, "Forbidden", self.to_string())
            }
            PortalError::AccountLocked => {
                (StatusCode::FORBIDDEN, "AccountLocked", self.to_string())
            }
            PortalError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            PortalError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            PortalError::RateLimitExceeded { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RateLimitExceeded",
                "Rate limit exceeded".to_string(),
            ),
            PortalError::Database(_) | PortalError::Internal(_) | PortalError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;
