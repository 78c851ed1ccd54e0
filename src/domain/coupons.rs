//! Coupon domain models and rules

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::payments::round2;

/// Prefix of every referral code minted after a booking
pub const REFERRAL_CODE_PREFIX: &str = "TREK";

/// Discount coupon as stored in `coupon_codes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount_percentage: u8,
    #[serde(default)]
    pub created_by: Option<String>,
    /// `None` means unlimited
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub current_uses: u32,
    pub is_active: bool,
    pub estimated_expiry: DateTime<Utc>,
    /// Treks the coupon is restricted to; empty or absent means every trek
    #[serde(default)]
    pub trek_ids: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Why a coupon cannot be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("Invalid or inactive coupon code")]
    InvalidOrInactive,
    #[error("Coupon code has expired")]
    Expired,
    #[error("Coupon code has reached maximum uses")]
    Exhausted,
    #[error("This coupon is not valid for this trek")]
    NotValidForTrek,
}

impl CouponRejection {
    /// Short label for metrics
    pub fn as_label(&self) -> &'static str {
        match self {
            CouponRejection::InvalidOrInactive => "invalid",
            CouponRejection::Expired => "expired",
            CouponRejection::Exhausted => "exhausted",
            CouponRejection::NotValidForTrek => "out_of_scope",
        }
    }
}

/// Price after applying a coupon percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouponDiscount {
    pub discount_percentage: u8,
    pub original_amount: f64,
    pub discount_amount: f64,
    pub final_amount: f64,
}

impl CouponDiscount {
    /// `discount = round2(amount * pct / 100)`, `final = round2(amount - discount)`
    pub fn compute(amount: f64, discount_percentage: u8) -> Self {
        let discount_amount = round2(amount * f64::from(discount_percentage) / 100.0);
        let final_amount = round2(amount - discount_amount);
        Self {
            discount_percentage,
            original_amount: amount,
            discount_amount,
            final_amount,
        }
    }

    /// Full price, nothing applied
    pub fn none(amount: f64) -> Self {
        Self {
            discount_percentage: 0,
            original_amount: amount,
            discount_amount: 0.0,
            final_amount: amount,
        }
    }
}

impl Coupon {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.estimated_expiry < now
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.current_uses >= max)
    }

    pub fn applies_to_trek(&self, trek_id: &str) -> bool {
        match &self.trek_ids {
            Some(ids) if !ids.is_empty() => ids.iter().any(|id| id == trek_id),
            _ => true,
        }
    }

    /// Apply the usability rules in order, stopping at the first failure
    pub fn evaluate(&self, trek_id: &str, amount: f64, now: DateTime<Utc>) -> Result<CouponDiscount, CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::InvalidOrInactive);
        }
        if self.is_expired_at(now) {
            return Err(CouponRejection::Expired);
        }
        if self.is_exhausted() {
            return Err(CouponRejection::Exhausted);
        }
        if !self.applies_to_trek(trek_id) {
            return Err(CouponRejection::NotValidForTrek);
        }
        Ok(CouponDiscount::compute(amount, self.discount_percentage))
    }
}

/// Row written when a coupon is created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCoupon {
    pub code: String,
    pub discount_percentage: u8,
    pub created_by: Option<String>,
    pub max_uses: Option<u32>,
    pub is_active: bool,
    pub estimated_expiry: DateTime<Utc>,
    pub trek_ids: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Audit row for coupon generation events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCouponUsageLog {
    pub coupon_id: String,
    pub user_id: String,
    pub payment_id: String,
    pub trek_id: String,
    pub original_amount: f64,
    pub discount_amount: f64,
    pub final_amount: f64,
}

/// Referral code: `TREK` + first four characters of the trek id + random suffix, uppercased
pub fn referral_code(trek_id: &str, suffix: &str) -> String {
    let prefix: String = trek_id.chars().take(4).collect();
    format!("{}{}{}", REFERRAL_CODE_PREFIX, prefix.to_uppercase(), suffix.to_uppercase())
}

/// Source of the random part of referral codes
pub trait CodeSuffixSource: Send + Sync {
    /// Six uppercase hex characters
    fn next_suffix(&self) -> String;
}

/// Suffixes drawn from the thread-local CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffixSource;

impl CodeSuffixSource for RandomSuffixSource {
    fn next_suffix(&self) -> String {
        let mut bytes = [0u8; 3];
        rand::rng().fill_bytes(&mut bytes);
        hex::encode_upper(bytes)
    }
}
