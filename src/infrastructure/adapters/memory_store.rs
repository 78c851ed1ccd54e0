//! In-process datastore
//!
//! Mirrors the Supabase schema constraints (unique coupon code, unique
//! order/payment pair, conditional usage increment) so development mode and the
//! test suite exercise the same conflict paths as production.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::bookings::{Booking, NewBooking};
use crate::domain::coupons::{Coupon, NewCoupon, NewCouponUsageLog};
use crate::domain::ports::{BookingRepository, CouponRepository, DatastoreHealth, ProfileRepository};
use crate::shared::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct Tables {
    coupons: HashMap<String, Coupon>,
    usage_logs: Vec<NewCouponUsageLog>,
    bookings: Vec<Booking>,
    admins: HashSet<String>,
}

/// Datastore held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `user_profiles` marks the given users as admins
    pub fn with_admins<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tables = Tables {
            admins: admins.into_iter().map(Into::into).collect(),
            ..Tables::default()
        };
        Self { tables: Arc::new(RwLock::new(tables)) }
    }

    /// Insert a fully formed coupon row, bypassing the uniqueness check
    pub async fn seed_coupon(&self, coupon: Coupon) {
        self.tables.write().await.coupons.insert(coupon.id.clone(), coupon);
    }

    pub async fn coupons(&self) -> Vec<Coupon> {
        self.tables.read().await.coupons.values().cloned().collect()
    }

    pub async fn coupon_by_code(&self, code: &str) -> Option<Coupon> {
        self.tables.read().await.coupons.values().find(|c| c.code == code).cloned()
    }

    pub async fn usage_logs(&self) -> Vec<NewCouponUsageLog> {
        self.tables.read().await.usage_logs.clone()
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.tables.read().await.bookings.clone()
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Coupon>> {
        let tables = self.tables.read().await;
        Ok(tables.coupons.values().find(|c| c.code == code && c.is_active).cloned())
    }

    async fn code_exists(&self, code: &str) -> AppResult<bool> {
        Ok(self.tables.read().await.coupons.values().any(|c| c.code == code))
    }

    async fn insert_coupon(&self, coupon: &NewCoupon) -> AppResult<Coupon> {
        let mut tables = self.tables.write().await;
        if tables.coupons.values().any(|c| c.code == coupon.code) {
            return Err(AppError::Conflict(format!("Duplicate coupon code {}", coupon.code)));
        }

        let row = Coupon {
            id: Uuid::new_v4().to_string(),
            code: coupon.code.clone(),
            discount_percentage: coupon.discount_percentage,
            created_by: coupon.created_by.clone(),
            max_uses: coupon.max_uses,
            current_uses: 0,
            is_active: coupon.is_active,
            estimated_expiry: coupon.estimated_expiry,
            trek_ids: coupon.trek_ids.clone(),
            notes: coupon.notes.clone(),
            created_at: Utc::now(),
        };
        tables.coupons.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn insert_usage_log(&self, entry: &NewCouponUsageLog) -> AppResult<()> {
        self.tables.write().await.usage_logs.push(entry.clone());
        Ok(())
    }

    async fn list_coupons(&self) -> AppResult<Vec<Coupon>> {
        let mut coupons: Vec<Coupon> = self.tables.read().await.coupons.values().cloned().collect();
        coupons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(coupons)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Coupon>> {
        Ok(self.tables.read().await.coupons.get(id).cloned())
    }

    async fn set_active(&self, id: &str, current: bool) -> AppResult<Option<Coupon>> {
        let mut tables = self.tables.write().await;
        Ok(tables.coupons.get_mut(id).filter(|c| c.is_active == current).map(|coupon| {
            coupon.is_active = !current;
            coupon.clone()
        }))
    }

    async fn increment_usage(&self, code: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(coupon) = tables.coupons.values_mut().find(|c| c.code == code && c.is_active) else {
            return Ok(false);
        };
        if coupon.is_exhausted() {
            return Ok(false);
        }
        coupon.current_uses += 1;
        Ok(true)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert_booking(&self, booking: &NewBooking) -> AppResult<Booking> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.bookings.iter().any(|b| {
            b.razorpay_order_id == booking.razorpay_order_id && b.razorpay_payment_id == booking.razorpay_payment_id
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "Booking already exists for {}/{}",
                booking.razorpay_order_id, booking.razorpay_payment_id
            )));
        }

        let row = Booking {
            id: Uuid::new_v4().to_string(),
            trek_id: booking.trek_id.clone(),
            user_name: booking.user_name.clone(),
            user_email: booking.user_email.clone(),
            razorpay_order_id: booking.razorpay_order_id.clone(),
            razorpay_payment_id: booking.razorpay_payment_id.clone(),
            razorpay_signature: booking.razorpay_signature.clone(),
            status: booking.status,
            amount: booking.amount,
            currency: booking.currency.clone(),
            created_at: booking.created_at,
        };
        tables.bookings.push(row.clone());
        Ok(row)
    }

    async fn find_by_payment(&self, order_id: &str, payment_id: &str) -> AppResult<Option<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .find(|b| b.razorpay_order_id == order_id && b.razorpay_payment_id == payment_id)
            .cloned())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn is_admin(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.tables.read().await.admins.contains(user_id))
    }
}

#[async_trait]
impl DatastoreHealth for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
