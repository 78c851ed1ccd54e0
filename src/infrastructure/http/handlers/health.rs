//! Health check handler

use crate::{
    application::use_cases::HealthCheckUseCase,
    infrastructure::http::responses::ResponseFormatter,
    middleware::security_headers::SecurityHeadersMiddleware,
};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Reply;

/// Handle health check requests
pub async fn handle_health_request(
    health_use_case: Arc<HealthCheckUseCase>,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let response = match health_use_case.execute().await {
        Ok(health) => {
            let status = StatusCode::from_u16(health.http_status_code()).unwrap_or(StatusCode::OK);
            ResponseFormatter::success(&health, status, &security)
        }
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            ResponseFormatter::error_with_status("Service unhealthy", StatusCode::SERVICE_UNAVAILABLE, &security)
        }
    };
    Ok(response)
}
