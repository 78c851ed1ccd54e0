//! Checkout service: validates a booking request, applies an optional coupon and
//! opens a hosted payment link for the final price

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{error, info};

use crate::application::services::coupon_service::CouponService;
use crate::config::app_config::RazorpayConfig;
use crate::domain::coupons::CouponDiscount;
use crate::domain::payments::{
    to_minor_units, CheckoutCustomer, OrderNotes, PaymentLinkRequest, MINIMUM_CHARGE_MINOR_UNITS,
};
use crate::domain::ports::PaymentGateway;
use crate::shared::error::{AppError, AppResult, PAYMENT_SERVICE_UNAVAILABLE};
use crate::shared::metrics::AppMetrics;
use crate::shared::validation::ValidationUtils;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub trek_id: Option<String>,
    pub amount: Option<f64>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub coupon_code: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub id: String,
    #[serde(rename = "short_url")]
    pub short_url: String,
    pub original_amount: f64,
    pub final_amount: f64,
    pub discount_amount: f64,
    pub coupon_applied: bool,
}

pub struct CheckoutService {
    gateway: Option<Arc<dyn PaymentGateway>>,
    coupons: Arc<CouponService>,
    currency: String,
    business_name: String,
    callback_url: Option<String>,
    metrics: AppMetrics,
}

impl CheckoutService {
    pub fn new(
        gateway: Option<Arc<dyn PaymentGateway>>,
        coupons: Arc<CouponService>,
        razorpay: &RazorpayConfig,
        public_base_url: Option<&str>,
        metrics: AppMetrics,
    ) -> Self {
        Self {
            gateway,
            coupons,
            currency: razorpay.currency.clone(),
            business_name: razorpay.business_name.clone(),
            callback_url: public_base_url.and_then(callback_url_for),
            metrics,
        }
    }

    /// `POST /api/payment/create-order`
    pub async fn create_order(&self, request: CreateOrderRequest) -> AppResult<CreateOrderResponse> {
        let Some(gateway) = self.gateway.as_ref() else {
            error!("Checkout requested but gateway credentials are not configured");
            self.metrics.record_checkout("unavailable");
            return Err(AppError::ServiceUnavailable(PAYMENT_SERVICE_UNAVAILABLE.to_string()));
        };

        let result = self.open_session(gateway.as_ref(), request).await;
        self.metrics.record_checkout(match &result {
            Ok(_) => "created",
            Err(e) if e.http_status_code().is_client_error() => "rejected",
            Err(_) => "failed",
        });
        result
    }

    async fn open_session(&self, gateway: &dyn PaymentGateway, request: CreateOrderRequest) -> AppResult<CreateOrderResponse> {
        let (Some(trek_id), Some(amount), Some(user_email), Some(user_name)) = (
            request.trek_id.as_deref().filter(|v| !v.is_empty()),
            request.amount.filter(|a| *a != 0.0),
            request.user_email.as_deref().filter(|v| !v.is_empty()),
            request.user_name.as_deref().filter(|v| !v.is_empty()),
        ) else {
            return Err(AppError::Validation(
                "Missing required fields: trekId, amount, userEmail, userName".to_string(),
            ));
        };

        ValidationUtils::validate_trek_id(trek_id)?;
        ValidationUtils::validate_amount(amount)?;
        ValidationUtils::validate_email(user_email)?;
        ValidationUtils::validate_user_name(user_name)?;

        let coupon = match ValidationUtils::non_blank(request.coupon_code.as_deref()) {
            Some(code) => Some(
                self.coupons
                    .evaluate(code, trek_id, amount)
                    .await
                    .map_err(|e| e.into_service_error("Coupon validation failed"))?,
            ),
            None => None,
        };

        let discount = coupon
            .as_ref()
            .map(|c| CouponDiscount {
                discount_percentage: c.discount_percentage,
                original_amount: c.original_amount,
                discount_amount: c.discount_amount,
                final_amount: c.final_amount,
            })
            .unwrap_or_else(|| CouponDiscount::none(amount));

        let charge = to_minor_units(discount.final_amount);
        if charge < MINIMUM_CHARGE_MINOR_UNITS {
            info!(
                trek_id = trek_id,
                final_amount = discount.final_amount,
                "Discounted price is below the minimum charge"
            );
            return Err(AppError::Rejected(
                "Final amount after discount must be at least 1.00".to_string(),
            ));
        }

        let mut notes = OrderNotes::new()
            .with(OrderNotes::TREK_ID, trek_id)
            .with(OrderNotes::USER_EMAIL, user_email)
            .with(OrderNotes::USER_NAME, user_name)
            .with(OrderNotes::ORIGINAL_AMOUNT, discount.original_amount)
            .with(OrderNotes::FINAL_AMOUNT, discount.final_amount)
            .with(OrderNotes::DISCOUNT_AMOUNT, discount.discount_amount)
            .with(OrderNotes::DISCOUNT_PERCENTAGE, discount.discount_percentage);
        if let Some(coupon) = &coupon {
            notes = notes.with(OrderNotes::COUPON_CODE, &coupon.code);
        }
        if let Some(user_id) = ValidationUtils::non_blank(request.user_id.as_deref()) {
            notes = notes.with(OrderNotes::USER_ID, user_id);
        }

        let link = PaymentLinkRequest {
            amount: charge,
            currency: self.currency.clone(),
            reference_id: reference_id(trek_id, Utc::now().timestamp_millis()),
            description: format!("{} trek booking: {}", self.business_name, trek_id),
            customer: CheckoutCustomer {
                name: user_name.to_string(),
                email: user_email.to_string(),
            },
            notes,
            callback_url: self.callback_url.clone(),
        };

        info!(
            trek_id = trek_id,
            amount = link.amount,
            coupon_applied = coupon.is_some(),
            reference = %link.reference_id,
            "Creating payment link"
        );

        let session = gateway.create_payment_link(&link).await.map_err(|e| {
            error!(error = %e, reference = %link.reference_id, "Payment link creation failed");
            match e {
                AppError::Gateway(_) | AppError::ServiceUnavailable(_) | AppError::Timeout(_) => e,
                other => AppError::Gateway(other.to_string()),
            }
        })?;

        Ok(CreateOrderResponse {
            id: session.id,
            short_url: session.short_url,
            original_amount: discount.original_amount,
            final_amount: discount.final_amount,
            discount_amount: discount.discount_amount,
            coupon_applied: coupon.is_some(),
        })
    }
}

/// Gateway receipt reference; Razorpay caps it at 40 characters
fn reference_id(trek_id: &str, millis: i64) -> String {
    let short: String = trek_id.chars().take(20).collect();
    format!("trek-{}-{}", short, millis)
}

/// `<base>/success`, unless the base URL points at this machine
fn callback_url_for(base_url: &str) -> Option<String> {
    let url = reqwest::Url::parse(base_url).ok()?;
    let host = url.host_str()?;
    if host.eq_ignore_ascii_case("localhost") {
        return None;
    }
    if let Ok(ip) = host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
        if ip.is_loopback() || ip.is_unspecified() {
            return None;
        }
    }
    Some(format!("{}/success", base_url.trim_end_matches('/')))
}
