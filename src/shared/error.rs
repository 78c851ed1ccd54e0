//! Error handling module
//!
//! This module provides centralized error handling for the application.

use thiserror::Error;
use warp::http::StatusCode;

/// Caller-facing message when the gateway cannot be used
pub const PAYMENT_SERVICE_UNAVAILABLE: &str = "Payment service unavailable. Please contact support.";
/// Caller-facing message for every other availability failure
pub const SERVICE_UNAVAILABLE: &str = "Service unavailable. Please contact support.";

/// Application error types
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule rejection (coupon or order data); message is shown to the caller
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Payment signature mismatch
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation reported by the datastore
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    /// Collaborator missing or unreachable; message is shown to the caller
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Upstream timeout: {0}")]
    Timeout(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Datastore error: {0}")]
    Datastore(String),

    /// Server-side failure whose message is safe to show to the caller
    #[error("Service error: {0}")]
    Service(String),

    #[error("JSON serialization error: {0}")]
    Json(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Rejected(_)
            | AppError::Integrity(_)
            | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) | AppError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Upstream and internal detail stays in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Rejected(msg)
            | AppError::Integrity(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::Service(msg) => msg.clone(),
            AppError::Json(_) => "Invalid request body".to_string(),
            AppError::Authentication(_) => "Unauthorized".to_string(),
            AppError::RateLimit => "Rate limit exceeded. Please slow down.".to_string(),
            AppError::Timeout(_) | AppError::Config(_) => SERVICE_UNAVAILABLE.to_string(),
            AppError::Gateway(_) => "Payment service error. Please try again later.".to_string(),
            AppError::Datastore(_) | AppError::Internal(_) => {
                "Internal server error. Please try again later.".to_string()
            }
        }
    }

    /// Whether the failure means a collaborator could not be reached in time
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::ServiceUnavailable(_) | AppError::Timeout(_))
    }

    /// Replace an upstream failure with a caller-safe message. Client errors and
    /// the availability class pass through untouched.
    pub fn into_service_error(self, message: &str) -> AppError {
        if self.is_unavailable() || self.http_status_code().is_client_error() {
            self
        } else {
            AppError::Service(message.to_string())
        }
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;

// Implement warp::reject::Reject for AppError
impl warp::reject::Reject for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_connect() {
            AppError::ServiceUnavailable(SERVICE_UNAVAILABLE.to_string())
        } else {
            AppError::Internal(format!("HTTP client error: {}", err))
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Authentication(err.to_string())
    }
}
