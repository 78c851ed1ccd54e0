//! HTTP models - Infrastructure concerns
//!
//! Per-request bookkeeping and the bundle of services the routes are built from.

use std::sync::Arc;
use std::time::Instant;

use crate::application::services::{CheckoutService, CouponAdminService, CouponService, VerificationService};
use crate::application::use_cases::HealthCheckUseCase;
use crate::config::AppConfig;
use crate::domain::coupons::CodeSuffixSource;
use crate::domain::ports::PaymentGateway;
use crate::domain::security::PaymentSignatureVerifier;
use crate::infrastructure::adapters::{AuthenticationAdapter, Repositories};
use crate::shared::logging::LoggingUtils;
use crate::shared::metrics::AppMetrics;

/// HTTP request context for tracking and logging
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request ID
    pub request_id: String,

    /// Client IP address
    pub client_ip: String,

    /// Logical endpoint name, e.g. `payment.verify`
    pub endpoint: &'static str,

    started_at: Instant,
}

impl RequestContext {
    /// Create a context and log the incoming request
    pub fn new(endpoint: &'static str, client_ip: String) -> Self {
        let context = Self {
            request_id: LoggingUtils::generate_request_id(),
            client_ip,
            endpoint,
            started_at: Instant::now(),
        };
        LoggingUtils::log_request(&context.request_id, context.endpoint, &context.client_ip);
        context
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

/// Everything the API routes dispatch into
#[derive(Clone)]
pub struct ApiServices {
    pub checkout: Arc<CheckoutService>,
    pub verification: Arc<VerificationService>,
    pub coupons: Arc<CouponService>,
    pub coupon_admin: Arc<CouponAdminService>,
    pub auth: Arc<AuthenticationAdapter>,
    pub health: Arc<HealthCheckUseCase>,
    pub metrics: AppMetrics,
}

impl ApiServices {
    /// Wire the application services onto one datastore and an optional gateway
    pub fn assemble(
        config: &AppConfig,
        repositories: Repositories,
        gateway: Option<Arc<dyn PaymentGateway>>,
        suffixes: Arc<dyn CodeSuffixSource>,
        metrics: AppMetrics,
    ) -> Self {
        let verifier = config
            .razorpay
            .has_credentials()
            .then(|| PaymentSignatureVerifier::new(config.razorpay.key_secret.clone()));

        let coupons = Arc::new(CouponService::new(
            repositories.coupons.clone(),
            config.coupons.clone(),
            suffixes,
            metrics.clone(),
        ));
        let checkout = Arc::new(CheckoutService::new(
            gateway.clone(),
            coupons.clone(),
            &config.razorpay,
            config.server.public_base_url.as_deref(),
            metrics.clone(),
        ));
        let verification = Arc::new(VerificationService::new(
            gateway.clone(),
            verifier,
            repositories.bookings.clone(),
            repositories.coupons.clone(),
            config.razorpay.currency.clone(),
            metrics.clone(),
        ));
        let coupon_admin = Arc::new(CouponAdminService::new(
            repositories.coupons.clone(),
            repositories.profiles.clone(),
            config.auth.admin_user_ids.clone(),
            config.coupons.clone(),
        ));
        let health = Arc::new(HealthCheckUseCase::new(repositories.health.clone(), gateway.is_some()));

        Self {
            checkout,
            verification,
            coupons,
            coupon_admin,
            auth: Arc::new(AuthenticationAdapter::new(&config.auth)),
            health,
            metrics,
        }
    }
}
