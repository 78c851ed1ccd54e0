//! Admin routes module

use crate::{
    application::services::CouponAdminService,
    config::AppConfig,
    infrastructure::adapters::AuthenticationAdapter,
    infrastructure::http::{
        handlers::{handle_create_coupon, handle_list_coupons, handle_toggle_coupon},
        utils::{
            with_authorization, with_client_ip, with_json_body, with_rate_limit_middleware, with_security_headers,
            with_shared,
        },
    },
    middleware::{rate_limit::RateLimitMiddleware, security_headers::SecurityHeadersMiddleware},
};
use std::sync::Arc;
use warp::Filter;

/// Admin coupon management routes
pub struct AdminRoutes;

impl AdminRoutes {
    pub fn create_routes(
        config: &AppConfig,
        admin: Arc<CouponAdminService>,
        auth: Arc<AuthenticationAdapter>,
        rate_limit: Arc<RateLimitMiddleware>,
        security: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let list = warp::path!("api" / "admin" / "coupons")
            .and(warp::get())
            .and(with_client_ip(config))
            .and(with_authorization())
            .and(with_shared(admin.clone()))
            .and(with_shared(auth.clone()))
            .and(with_rate_limit_middleware(rate_limit.clone()))
            .and(with_security_headers(security.clone()))
            .and_then(handle_list_coupons);

        let create = warp::path!("api" / "admin" / "coupons")
            .and(warp::post())
            .and(with_json_body(config))
            .and(with_client_ip(config))
            .and(with_authorization())
            .and(with_shared(admin.clone()))
            .and(with_shared(auth.clone()))
            .and(with_rate_limit_middleware(rate_limit.clone()))
            .and(with_security_headers(security.clone()))
            .and_then(handle_create_coupon);

        let toggle = warp::path!("api" / "admin" / "coupons" / String / "toggle")
            .and(warp::post())
            .and(with_client_ip(config))
            .and(with_authorization())
            .and(with_shared(admin))
            .and(with_shared(auth))
            .and(with_rate_limit_middleware(rate_limit))
            .and(with_security_headers(security))
            .and_then(handle_toggle_coupon);

        list.or(create).or(toggle)
    }
}
