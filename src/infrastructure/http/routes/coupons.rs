//! Coupon routes module

use crate::{
    application::services::CouponService,
    config::AppConfig,
    infrastructure::adapters::AuthenticationAdapter,
    infrastructure::http::{
        handlers::{handle_generate_coupon, handle_validate_coupon},
        utils::{
            with_authorization, with_client_ip, with_json_body, with_rate_limit_middleware, with_security_headers,
            with_shared,
        },
    },
    middleware::{rate_limit::RateLimitMiddleware, security_headers::SecurityHeadersMiddleware},
};
use std::sync::Arc;
use warp::Filter;

/// Coupon routes configuration
pub struct CouponRoutes;

impl CouponRoutes {
    /// `POST /api/coupon/validate` and `POST /api/coupon/generate`
    pub fn create_routes(
        config: &AppConfig,
        coupons: Arc<CouponService>,
        auth: Arc<AuthenticationAdapter>,
        rate_limit: Arc<RateLimitMiddleware>,
        security: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let validate = warp::path!("api" / "coupon" / "validate")
            .and(warp::post())
            .and(with_json_body(config))
            .and(with_client_ip(config))
            .and(with_shared(coupons.clone()))
            .and(with_rate_limit_middleware(rate_limit.clone()))
            .and(with_security_headers(security.clone()))
            .and_then(handle_validate_coupon);

        let generate = warp::path!("api" / "coupon" / "generate")
            .and(warp::post())
            .and(with_json_body(config))
            .and(with_client_ip(config))
            .and(with_authorization())
            .and(with_shared(coupons))
            .and(with_shared(auth))
            .and(with_rate_limit_middleware(rate_limit))
            .and(with_security_headers(security))
            .and_then(handle_generate_coupon);

        validate.or(generate)
    }
}
