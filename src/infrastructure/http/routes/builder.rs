//! Route builder module
//!
//! Combines every route group and normalizes rejections into the standard
//! error shape.

use crate::{
    config::AppConfig,
    infrastructure::http::{
        models::ApiServices,
        responses::handle_rejection,
        routes::{AdminRoutes, CouponRoutes, HealthRoutes, MetricsRoutes, PaymentRoutes},
    },
    middleware::{rate_limit::RateLimitMiddleware, security_headers::SecurityHeadersMiddleware},
};
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection};

/// Route builder that orchestrates the creation of all application routes
pub struct RouteBuilder;

impl RouteBuilder {
    /// Build all application routes
    pub fn build_routes(
        config: &AppConfig,
        services: ApiServices,
    ) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
        let security = Arc::new(SecurityHeadersMiddleware::new(config));
        let rate_limit = Arc::new(RateLimitMiddleware::new(config, services.metrics.clone()));

        let payment_routes = PaymentRoutes::create_routes(
            config,
            services.checkout,
            services.verification,
            rate_limit.clone(),
            security.clone(),
        );

        let coupon_routes = CouponRoutes::create_routes(
            config,
            services.coupons,
            services.auth.clone(),
            rate_limit.clone(),
            security.clone(),
        );

        let admin_routes = AdminRoutes::create_routes(
            config,
            services.coupon_admin,
            services.auth,
            rate_limit,
            security.clone(),
        );

        let health_route = HealthRoutes::create_health_route(services.health, security.clone());
        let metrics_route = MetricsRoutes::create_metrics_route(services.metrics, security.clone());

        payment_routes
            .or(coupon_routes)
            .or(admin_routes)
            .or(health_route)
            .or(metrics_route)
            .recover(move |rejection: Rejection| handle_rejection(rejection, security.clone()))
    }
}
