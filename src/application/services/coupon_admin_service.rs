//! Admin coupon management: listing, manual creation and activation toggles

use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::app_config::CouponConfig;
use crate::domain::coupons::{Coupon, NewCoupon};
use crate::domain::identity::Identity;
use crate::domain::ports::{CouponRepository, ProfileRepository};
use crate::shared::error::{AppError, AppResult};
use crate::shared::validation::ValidationUtils;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub code: Option<String>,
    pub discount_percentage: Option<i64>,
    pub max_uses: Option<i64>,
    pub notes: Option<String>,
    pub trek_ids: Option<Vec<String>>,
    pub expiry_days: Option<i64>,
}

pub struct CouponAdminService {
    coupons: Arc<dyn CouponRepository>,
    profiles: Arc<dyn ProfileRepository>,
    admin_user_ids: Vec<String>,
    settings: CouponConfig,
}

impl CouponAdminService {
    pub fn new(
        coupons: Arc<dyn CouponRepository>,
        profiles: Arc<dyn ProfileRepository>,
        admin_user_ids: Vec<String>,
        settings: CouponConfig,
    ) -> Self {
        Self { coupons, profiles, admin_user_ids, settings }
    }

    /// Admins are flagged in `user_profiles`; configured ids are admitted as well
    pub async fn require_admin(&self, identity: &Identity) -> AppResult<()> {
        if self.admin_user_ids.iter().any(|id| id == &identity.user_id) {
            return Ok(());
        }
        if self.profiles.is_admin(&identity.user_id).await? {
            return Ok(());
        }
        warn!(user_id = %identity.user_id, "Non-admin attempted coupon management");
        Err(AppError::Forbidden("Admin access required".to_string()))
    }

    pub async fn list(&self, identity: &Identity) -> AppResult<Vec<Coupon>> {
        self.require_admin(identity).await?;
        self.coupons.list_coupons().await
    }

    pub async fn create(&self, identity: &Identity, request: CreateCouponRequest) -> AppResult<Coupon> {
        self.require_admin(identity).await?;

        let code = ValidationUtils::non_blank(request.code.as_deref())
            .map(str::to_uppercase)
            .ok_or_else(|| AppError::Validation("Missing required fields: code, discountPercentage".to_string()))?;
        ValidationUtils::validate_coupon_code(&code)?;

        let discount_percentage = request
            .discount_percentage
            .ok_or_else(|| AppError::Validation("Missing required fields: code, discountPercentage".to_string()))?;
        let discount_percentage = u8::try_from(discount_percentage)
            .ok()
            .filter(|pct| (1..=100).contains(pct))
            .ok_or_else(|| AppError::Validation("Discount percentage must be between 1 and 100".to_string()))?;

        let max_uses = match request.max_uses {
            None => None,
            Some(n) => Some(
                u32::try_from(n)
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| AppError::Validation("Max uses must be at least 1".to_string()))?,
            ),
        };

        let expiry_days = request.expiry_days.unwrap_or(i64::from(self.settings.default_validity_days));
        if !(1..=3650).contains(&expiry_days) {
            return Err(AppError::Validation("Expiry must be between 1 and 3650 days".to_string()));
        }

        let trek_ids = request.trek_ids.map(|ids| {
            ids.into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect::<Vec<_>>()
        });
        if let Some(ids) = &trek_ids {
            for id in ids {
                ValidationUtils::validate_trek_id(id)?;
            }
        }

        let row = NewCoupon {
            code: code.clone(),
            discount_percentage,
            created_by: Some(identity.user_id.clone()),
            max_uses,
            is_active: true,
            estimated_expiry: Utc::now() + Duration::days(expiry_days),
            trek_ids: trek_ids.filter(|ids| !ids.is_empty()),
            notes: ValidationUtils::non_blank(request.notes.as_deref()).map(str::to_string),
        };

        let coupon = self.coupons.insert_coupon(&row).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::Conflict("Coupon code already exists".to_string()),
            other => other.into_service_error("Failed to create coupon code"),
        })?;
        info!(code = %coupon.code, admin = %identity.user_id, "Coupon created");
        Ok(coupon)
    }

    /// Flip `is_active`; coupons are never deleted
    pub async fn toggle(&self, identity: &Identity, coupon_id: &str) -> AppResult<Coupon> {
        self.require_admin(identity).await?;

        let current = self
            .coupons
            .find_by_id(coupon_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))?;

        let Some(updated) = self.coupons.set_active(coupon_id, current.is_active).await? else {
            warn!(coupon_id = coupon_id, admin = %identity.user_id, "Coupon changed between read and toggle");
            return Err(AppError::Conflict("Coupon was changed by another request. Please retry.".to_string()));
        };
        info!(code = %updated.code, is_active = updated.is_active, admin = %identity.user_id, "Coupon toggled");
        Ok(updated)
    }
}
