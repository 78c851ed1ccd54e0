//! Prometheus exposition handler

use crate::{
    infrastructure::http::responses::ResponseFormatter,
    middleware::security_headers::{add_security_headers_to_response, SecurityHeadersMiddleware},
    shared::metrics::AppMetrics,
};
use std::sync::Arc;
use warp::Reply;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Handle Prometheus metrics requests
pub async fn handle_prometheus_request(
    metrics: AppMetrics,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let response = match metrics.render() {
        Ok(text) => add_security_headers_to_response(
            warp::reply::with_header(text, "content-type", PROMETHEUS_CONTENT_TYPE),
            &security,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Metrics rendering failed");
            ResponseFormatter::error(&e, &security)
        }
    };
    Ok(response)
}
