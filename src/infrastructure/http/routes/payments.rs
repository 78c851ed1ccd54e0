//! Payment routes module

use crate::{
    application::services::{CheckoutService, VerificationService},
    config::AppConfig,
    infrastructure::http::{
        handlers::{handle_create_order, handle_verify_payment},
        utils::{with_client_ip, with_json_body, with_rate_limit_middleware, with_security_headers, with_shared},
    },
    middleware::{rate_limit::RateLimitMiddleware, security_headers::SecurityHeadersMiddleware},
};
use std::sync::Arc;
use warp::Filter;

/// Payment routes configuration
pub struct PaymentRoutes;

impl PaymentRoutes {
    /// `POST /api/payment/create-order` and `POST /api/payment/verify`
    pub fn create_routes(
        config: &AppConfig,
        checkout: Arc<CheckoutService>,
        verification: Arc<VerificationService>,
        rate_limit: Arc<RateLimitMiddleware>,
        security: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let create_order = warp::path!("api" / "payment" / "create-order")
            .and(warp::post())
            .and(with_json_body(config))
            .and(with_client_ip(config))
            .and(with_shared(checkout))
            .and(with_rate_limit_middleware(rate_limit.clone()))
            .and(with_security_headers(security.clone()))
            .and_then(handle_create_order);

        let verify = warp::path!("api" / "payment" / "verify")
            .and(warp::post())
            .and(with_json_body(config))
            .and(with_client_ip(config))
            .and(with_shared(verification))
            .and(with_rate_limit_middleware(rate_limit))
            .and(with_security_headers(security))
            .and_then(handle_verify_payment);

        create_order.or(verify)
    }
}
