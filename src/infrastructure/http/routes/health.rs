//! Health routes module

use crate::{
    application::use_cases::HealthCheckUseCase,
    infrastructure::http::{
        handlers::handle_health_request,
        utils::{with_security_headers, with_shared},
    },
    middleware::security_headers::SecurityHeadersMiddleware,
};
use std::sync::Arc;
use warp::Filter;

/// Health routes configuration
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn create_health_route(
        health_use_case: Arc<HealthCheckUseCase>,
        security: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_shared(health_use_case))
            .and(with_security_headers(security))
            .and_then(handle_health_request)
    }
}
