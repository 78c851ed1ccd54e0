//! Metrics routes module

use crate::{
    infrastructure::http::{handlers::handle_prometheus_request, utils::with_security_headers},
    middleware::security_headers::SecurityHeadersMiddleware,
    shared::metrics::AppMetrics,
};
use std::sync::Arc;
use warp::Filter;

/// Metrics routes configuration
pub struct MetricsRoutes;

impl MetricsRoutes {
    /// Create the Prometheus exposition route
    pub fn create_metrics_route(
        metrics: AppMetrics,
        security: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(warp::any().map(move || metrics.clone()))
            .and(with_security_headers(security))
            .and_then(handle_prometheus_request)
    }
}
