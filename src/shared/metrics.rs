//! Metrics utilities module
//!
//! Prometheus counters for the checkout, verification and coupon flows.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Application metrics registry
#[derive(Clone)]
pub struct AppMetrics {
    registry: Registry,
    checkout_sessions: IntCounterVec,
    payment_verifications: IntCounterVec,
    coupon_validations: IntCounterVec,
    coupons_generated: IntCounter,
    rate_limited_requests: IntCounter,
}

impl AppMetrics {
    /// Create and register all collectors on a fresh registry
    pub fn new() -> crate::Result<Self> {
        let registry = Registry::new();

        let checkout_sessions = IntCounterVec::new(
            Opts::new("checkout_sessions_total", "Checkout session attempts by outcome"),
            &["outcome"],
        )
        .map_err(Self::map_err)?;
        let payment_verifications = IntCounterVec::new(
            Opts::new("payment_verifications_total", "Payment verifications by outcome"),
            &["outcome"],
        )
        .map_err(Self::map_err)?;
        let coupon_validations = IntCounterVec::new(
            Opts::new("coupon_validations_total", "Coupon validations by outcome"),
            &["outcome"],
        )
        .map_err(Self::map_err)?;
        let coupons_generated = IntCounter::new("coupons_generated_total", "Referral coupons minted")
            .map_err(Self::map_err)?;
        let rate_limited_requests = IntCounter::new("rate_limited_requests_total", "Requests refused by the rate limiter")
            .map_err(Self::map_err)?;

        registry.register(Box::new(checkout_sessions.clone())).map_err(Self::map_err)?;
        registry.register(Box::new(payment_verifications.clone())).map_err(Self::map_err)?;
        registry.register(Box::new(coupon_validations.clone())).map_err(Self::map_err)?;
        registry.register(Box::new(coupons_generated.clone())).map_err(Self::map_err)?;
        registry.register(Box::new(rate_limited_requests.clone())).map_err(Self::map_err)?;

        Ok(Self {
            registry,
            checkout_sessions,
            payment_verifications,
            coupon_validations,
            coupons_generated,
            rate_limited_requests,
        })
    }

    fn map_err(e: prometheus::Error) -> crate::shared::error::AppError {
        crate::shared::error::AppError::Internal(format!("metrics registration failed: {}", e))
    }

    pub fn record_checkout(&self, outcome: &str) {
        self.checkout_sessions.with_label_values(&[outcome]).inc();
    }

    pub fn record_verification(&self, outcome: &str) {
        self.payment_verifications.with_label_values(&[outcome]).inc();
    }

    pub fn record_coupon_validation(&self, outcome: &str) {
        self.coupon_validations.with_label_values(&[outcome]).inc();
    }

    pub fn record_coupon_generated(&self) {
        self.coupons_generated.inc();
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited_requests.inc();
    }

    /// Current value of a labelled verification counter
    pub fn verification_count(&self, outcome: &str) -> u64 {
        self.payment_verifications.with_label_values(&[outcome]).get()
    }

    /// Render the registry in the Prometheus text format
    pub fn render(&self) -> crate::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| crate::shared::error::AppError::Internal(format!("metrics encoding failed: {}", e)))?;
        String::from_utf8(buffer)
            .map_err(|e| crate::shared::error::AppError::Internal(format!("metrics encoding failed: {}", e)))
    }
}
