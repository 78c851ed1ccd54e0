//! HTTP responses module
//!
//! Success bodies are serialized as given; failures always take the shape
//! `{"success": false, "error": "<message>"}`.

use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Rejection;

use crate::infrastructure::http::models::RequestContext;
use crate::middleware::security_headers::{create_json_response_with_security_headers, SecurityHeadersMiddleware};
use crate::shared::error::{AppError, AppResult};
use crate::shared::logging::LoggingUtils;

/// Response formatter for HTTP responses
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn success<T: Serialize>(body: &T, status: StatusCode, security: &SecurityHeadersMiddleware) -> Response {
        create_json_response_with_security_headers(body, status, security)
    }

    /// Format an application error with its status and caller-safe message
    pub fn error(error: &AppError, security: &SecurityHeadersMiddleware) -> Response {
        Self::error_with_status(&error.client_message(), error.http_status_code(), security)
    }

    pub fn error_with_status(message: &str, status: StatusCode, security: &SecurityHeadersMiddleware) -> Response {
        create_json_response_with_security_headers(&json!({ "success": false, "error": message }), status, security)
    }

    /// Log the outcome of a request and render it
    pub fn finish<T: Serialize>(
        context: &RequestContext,
        result: AppResult<(StatusCode, T)>,
        security: &SecurityHeadersMiddleware,
    ) -> Response {
        match result {
            Ok((status, body)) => {
                LoggingUtils::log_success(&context.request_id, context.endpoint, context.elapsed_ms());
                Self::success(&body, status, security)
            }
            Err(error) => {
                LoggingUtils::log_error(&context.request_id, context.endpoint, &error, context.elapsed_ms());
                Self::error(&error, security)
            }
        }
    }
}

/// Turn unmatched routes and filter failures into the standard error shape
pub async fn handle_rejection(
    rejection: Rejection,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<Response, Infallible> {
    if let Some(error) = rejection.find::<AppError>() {
        return Ok(ResponseFormatter::error(error, &security));
    }

    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length header is required")
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if rejection.find::<warp::reject::InvalidHeader>().is_some()
        || rejection.find::<warp::reject::MissingHeader>().is_some()
    {
        (StatusCode::BAD_REQUEST, "Invalid request headers")
    } else {
        tracing::error!(rejection = ?rejection, "Unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error. Please try again later.")
    };

    Ok(ResponseFormatter::error_with_status(message, status, &security))
}
