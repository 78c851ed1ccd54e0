//! Payment verification service
//!
//! Confirms a returning customer's payment against the gateway, then writes the
//! booking exactly once. Coupon redemption is counted only on the first write.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::bookings::{Booking, NewBooking};
use crate::domain::ports::{BookingRepository, CouponRepository, PaymentGateway};
use crate::domain::security::PaymentSignatureVerifier;
use crate::shared::error::{AppError, AppResult, PAYMENT_SERVICE_UNAVAILABLE};
use crate::shared::logging::LoggingUtils;
use crate::shared::metrics::AppMetrics;
use crate::shared::validation::ValidationUtils;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

/// Booking produced by a verification, and whether this call wrote it
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub booking: Booking,
    pub created: bool,
}

pub struct VerificationService {
    gateway: Option<Arc<dyn PaymentGateway>>,
    verifier: Option<PaymentSignatureVerifier>,
    bookings: Arc<dyn BookingRepository>,
    coupons: Arc<dyn CouponRepository>,
    default_currency: String,
    metrics: AppMetrics,
}

impl VerificationService {
    pub fn new(
        gateway: Option<Arc<dyn PaymentGateway>>,
        verifier: Option<PaymentSignatureVerifier>,
        bookings: Arc<dyn BookingRepository>,
        coupons: Arc<dyn CouponRepository>,
        default_currency: String,
        metrics: AppMetrics,
    ) -> Self {
        Self { gateway, verifier, bookings, coupons, default_currency, metrics }
    }

    /// `POST /api/payment/verify`
    pub async fn verify(&self, request: VerifyPaymentRequest) -> AppResult<VerificationOutcome> {
        let (Some(gateway), Some(verifier)) = (self.gateway.as_ref(), self.verifier.as_ref()) else {
            error!("Verification requested but gateway credentials are not configured");
            self.metrics.record_verification("unavailable");
            return Err(AppError::ServiceUnavailable(PAYMENT_SERVICE_UNAVAILABLE.to_string()));
        };

        let result = self.verify_with(gateway.as_ref(), verifier, request).await;
        self.metrics.record_verification(match &result {
            Ok(outcome) if outcome.created => "booked",
            Ok(_) => "duplicate",
            Err(AppError::Integrity(_)) => "signature_mismatch",
            Err(e) if e.http_status_code().is_client_error() => "rejected",
            Err(_) => "failed",
        });
        result
    }

    async fn verify_with(
        &self,
        gateway: &dyn PaymentGateway,
        verifier: &PaymentSignatureVerifier,
        request: VerifyPaymentRequest,
    ) -> AppResult<VerificationOutcome> {
        let (Some(order_id), Some(payment_id), Some(signature)) = (
            request.order_id.as_deref().filter(|v| !v.is_empty()),
            request.razorpay_payment_id.as_deref().filter(|v| !v.is_empty()),
            request.razorpay_signature.as_deref().filter(|v| !v.is_empty()),
        ) else {
            return Err(AppError::Validation("Missing required verification fields".to_string()));
        };

        if !ValidationUtils::is_valid_order_id(order_id) {
            return Err(AppError::Validation("Invalid order ID format".to_string()));
        }
        if !ValidationUtils::is_valid_payment_id(payment_id) {
            return Err(AppError::Validation("Invalid payment ID format".to_string()));
        }
        if !ValidationUtils::is_valid_signature(signature) {
            return Err(AppError::Validation("Invalid signature format".to_string()));
        }

        if !verifier.verify(order_id, payment_id, signature) {
            LoggingUtils::log_security_event("signature_mismatch", &format!("order {}", order_id));
            return Err(AppError::Integrity("Payment verification failed".to_string()));
        }

        let order = gateway.fetch_order(order_id).await.map_err(|e| {
            error!(order_id = order_id, error = %e, "Failed to fetch order from gateway");
            e.into_service_error("Payment verification service error")
        })?;

        if order.id != order_id {
            error!(order_id = order_id, returned = %order.id, "Gateway returned a different order");
            return Err(AppError::Rejected("Order verification failed".to_string()));
        }

        let Some(new_booking) = NewBooking::from_verified_order(&order, payment_id, signature, &self.default_currency) else {
            error!(order_id = order_id, "Order notes are missing booking fields");
            return Err(AppError::Rejected("Order data verification failed".to_string()));
        };

        match self.bookings.insert_booking(&new_booking).await {
            Ok(booking) => {
                info!(
                    order_id = order_id,
                    payment_id = payment_id,
                    trek_id = %booking.trek_id,
                    amount = booking.amount,
                    "Booking confirmed"
                );
                if let Some(code) = order.notes.coupon_code() {
                    self.redeem_coupon(code, order_id).await;
                }
                Ok(VerificationOutcome { booking, created: true })
            }
            Err(AppError::Conflict(_)) => {
                info!(order_id = order_id, payment_id = payment_id, "Booking already recorded");
                let existing = self
                    .bookings
                    .find_by_payment(order_id, payment_id)
                    .await
                    .map_err(|e| e.into_service_error("Failed to process booking"))?
                    .ok_or_else(|| AppError::Service("Failed to process booking".to_string()))?;
                Ok(VerificationOutcome { booking: existing, created: false })
            }
            Err(e) => {
                error!(order_id = order_id, error = %e, "Booking insert failed");
                Err(e.into_service_error("Failed to process booking"))
            }
        }
    }

    /// Count one use of the coupon the customer paid with. Never fails the booking.
    async fn redeem_coupon(&self, code: &str, order_id: &str) {
        match self.coupons.increment_usage(code).await {
            Ok(true) => info!(code = code, order_id = order_id, "Coupon use recorded"),
            Ok(false) => warn!(code = code, order_id = order_id, "Coupon use not recorded: inactive or at cap"),
            Err(e) => warn!(code = code, order_id = order_id, error = %e, "Coupon use increment failed"),
        }
    }
}
