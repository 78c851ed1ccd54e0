//! Coupon service: validation against the usability rules and referral code issuance

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::app_config::CouponConfig;
use crate::domain::coupons::{referral_code, CodeSuffixSource, CouponDiscount, CouponRejection, NewCoupon, NewCouponUsageLog};
use crate::domain::identity::Identity;
use crate::domain::ports::CouponRepository;
use crate::shared::error::{AppError, AppResult};
use crate::shared::metrics::AppMetrics;
use crate::shared::validation::ValidationUtils;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    pub coupon_code: Option<String>,
    pub amount: Option<f64>,
    pub trek_id: Option<String>,
}

/// Priced coupon returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub id: String,
    pub code: String,
    pub discount_percentage: u8,
    pub discount_amount: f64,
    pub final_amount: f64,
    pub original_amount: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCouponRequest {
    pub user_id: Option<String>,
    pub trek_id: Option<String>,
    pub payment_id: Option<String>,
    pub amount: Option<f64>,
}

/// Referral coupon handed back after a booking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCoupon {
    pub code: String,
    pub discount_percentage: u8,
    pub valid_for: String,
    pub expiry_date: chrono::DateTime<Utc>,
}

pub struct CouponService {
    coupons: Arc<dyn CouponRepository>,
    settings: CouponConfig,
    suffixes: Arc<dyn CodeSuffixSource>,
    metrics: AppMetrics,
}

impl CouponService {
    pub fn new(
        coupons: Arc<dyn CouponRepository>,
        settings: CouponConfig,
        suffixes: Arc<dyn CodeSuffixSource>,
        metrics: AppMetrics,
    ) -> Self {
        Self { coupons, settings, suffixes, metrics }
    }

    /// `POST /api/coupon/validate`
    pub async fn validate(&self, request: ValidateCouponRequest) -> AppResult<CouponValidation> {
        let (Some(code), Some(amount), Some(trek_id)) = (
            ValidationUtils::non_blank(request.coupon_code.as_deref()),
            request.amount.filter(|a| *a != 0.0),
            ValidationUtils::non_blank(request.trek_id.as_deref()),
        ) else {
            return Err(AppError::Validation(
                "Missing required fields: couponCode, amount, trekId".to_string(),
            ));
        };
        ValidationUtils::validate_amount(amount)?;

        self.evaluate(code, trek_id, amount)
            .await
            .map_err(|e| e.into_service_error("Coupon validation failed"))
    }

    /// Look a code up and apply it to a price. Business rejections come back as
    /// `AppError::Rejected` carrying the caller-facing reason.
    pub async fn evaluate(&self, code: &str, trek_id: &str, amount: f64) -> AppResult<CouponValidation> {
        let code = code.trim().to_uppercase();

        let outcome = match self.coupons.find_active_by_code(&code).await? {
            None => Err(CouponRejection::InvalidOrInactive),
            Some(coupon) => coupon
                .evaluate(trek_id, amount, Utc::now())
                .map(|discount| (coupon.id, coupon.code, discount)),
        };

        match outcome {
            Ok((id, code, discount)) => {
                self.metrics.record_coupon_validation("valid");
                Ok(Self::priced(id, code, discount))
            }
            Err(rejection) => {
                self.metrics.record_coupon_validation(rejection.as_label());
                info!(code = %code, trek_id = trek_id, reason = rejection.as_label(), "Coupon rejected");
                Err(AppError::Rejected(rejection.to_string()))
            }
        }
    }

    fn priced(id: String, code: String, discount: CouponDiscount) -> CouponValidation {
        CouponValidation {
            id,
            code,
            discount_percentage: discount.discount_percentage,
            discount_amount: discount.discount_amount,
            final_amount: discount.final_amount,
            original_amount: discount.original_amount,
        }
    }

    /// Fields a generation request cannot go without
    pub fn require_generation_fields(request: &GenerateCouponRequest) -> AppResult<()> {
        let complete = ValidationUtils::non_blank(request.user_id.as_deref()).is_some()
            && ValidationUtils::non_blank(request.trek_id.as_deref()).is_some()
            && ValidationUtils::non_blank(request.payment_id.as_deref()).is_some()
            && request.amount.is_some_and(|a| a != 0.0);
        if !complete {
            return Err(AppError::Validation(
                "Missing required fields: userId, trekId, paymentId, amount".to_string(),
            ));
        }
        Ok(())
    }

    /// `POST /api/coupon/generate`: mint a referral code for a completed booking
    pub async fn generate(&self, identity: &Identity, request: GenerateCouponRequest) -> AppResult<GeneratedCoupon> {
        Self::require_generation_fields(&request)?;
        let trek_id = request.trek_id.as_deref().unwrap_or_default().trim().to_string();
        ValidationUtils::validate_trek_id(&trek_id)?;
        let payment_id = request.payment_id.as_deref().unwrap_or_default().trim().to_string();
        let amount = request.amount.unwrap_or_default();

        if request.user_id.as_deref().map(str::trim) != Some(identity.user_id.as_str()) {
            warn!(
                identity = %identity.user_id,
                claimed = request.user_id.as_deref().unwrap_or(""),
                "Coupon requested for a different user id than the session"
            );
        }

        let expiry = Utc::now() + Duration::days(i64::from(self.settings.referral_validity_days));
        let mut coupon = None;

        for attempt in 1..=self.settings.generation_attempts {
            let code = referral_code(&trek_id, &self.suffixes.next_suffix());

            let taken = self
                .coupons
                .code_exists(&code)
                .await
                .map_err(|e| e.into_service_error("Coupon generation failed"))?;
            if taken {
                warn!(attempt = attempt, code = %code, "Generated coupon code collided");
                continue;
            }

            let row = NewCoupon {
                code: code.clone(),
                discount_percentage: self.settings.referral_discount_percentage,
                created_by: Some(identity.user_id.clone()),
                max_uses: Some(self.settings.referral_max_uses),
                is_active: true,
                estimated_expiry: expiry,
                trek_ids: Some(vec![trek_id.clone()]),
                notes: Some(format!("Generated for payment {} on trek {}", payment_id, trek_id)),
            };

            match self.coupons.insert_coupon(&row).await {
                Ok(inserted) => {
                    coupon = Some(inserted);
                    break;
                }
                Err(AppError::Conflict(_)) => {
                    warn!(attempt = attempt, code = %code, "Coupon code taken between check and insert");
                }
                Err(e) => {
                    tracing::error!(error = %e, code = %code, "Coupon insertion failed");
                    return Err(e.into_service_error("Failed to create coupon code"));
                }
            }
        }

        let Some(coupon) = coupon else {
            tracing::error!(
                trek_id = %trek_id,
                attempts = self.settings.generation_attempts,
                "Exhausted coupon code attempts"
            );
            return Err(AppError::Service("Failed to generate unique coupon code".to_string()));
        };

        let log = NewCouponUsageLog {
            coupon_id: coupon.id.clone(),
            user_id: identity.user_id.clone(),
            payment_id: payment_id.clone(),
            trek_id: trek_id.clone(),
            original_amount: amount,
            discount_amount: 0.0,
            final_amount: amount,
        };
        if let Err(e) = self.coupons.insert_usage_log(&log).await {
            warn!(error = %e, coupon_id = %coupon.id, "Failed to record coupon generation");
        }

        self.metrics.record_coupon_generated();
        info!(code = %coupon.code, trek_id = %trek_id, payment_id = %payment_id, "Referral coupon generated");

        Ok(GeneratedCoupon {
            code: coupon.code,
            discount_percentage: coupon.discount_percentage,
            valid_for: trek_id,
            expiry_date: coupon.estimated_expiry,
        })
    }
}
