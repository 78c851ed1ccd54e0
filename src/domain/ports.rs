//! Collaborator ports
//!
//! The payment gateway and the hosted datastore are reached only through these
//! traits, so services can be wired against Razorpay/Supabase in production and
//! against in-process doubles in development mode and tests.

use async_trait::async_trait;

use crate::domain::bookings::{Booking, NewBooking};
use crate::domain::coupons::{Coupon, NewCoupon, NewCouponUsageLog};
use crate::domain::payments::{CheckoutSession, GatewayOrder, PaymentLinkRequest};
use crate::shared::error::AppResult;

/// Hosted payment gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session for the given charge
    async fn create_payment_link(&self, request: &PaymentLinkRequest) -> AppResult<CheckoutSession>;

    /// Fetch the gateway's authoritative copy of an order
    async fn fetch_order(&self, order_id: &str) -> AppResult<GatewayOrder>;
}

/// `coupon_codes` and `coupon_usage_logs`
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Active coupon with exactly this (uppercase) code
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Coupon>>;

    /// Whether any coupon, active or not, already uses the code
    async fn code_exists(&self, code: &str) -> AppResult<bool>;

    /// Insert a coupon. A duplicate code yields `AppError::Conflict`.
    async fn insert_coupon(&self, coupon: &NewCoupon) -> AppResult<Coupon>;

    async fn insert_usage_log(&self, entry: &NewCouponUsageLog) -> AppResult<()>;

    /// All coupons, newest first
    async fn list_coupons(&self) -> AppResult<Vec<Coupon>>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Coupon>>;

    /// Flip `is_active` away from `current`. Only a row that still holds
    /// `current` is written; `None` means no such row.
    async fn set_active(&self, id: &str, current: bool) -> AppResult<Option<Coupon>>;

    /// Conditionally bump `current_uses`. Returns `false` when the coupon is
    /// inactive, unknown, or already at its cap.
    async fn increment_usage(&self, code: &str) -> AppResult<bool>;
}

/// `bookings`
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking. A duplicate (order, payment) pair yields `AppError::Conflict`.
    async fn insert_booking(&self, booking: &NewBooking) -> AppResult<Booking>;

    async fn find_by_payment(&self, order_id: &str, payment_id: &str) -> AppResult<Option<Booking>>;
}

/// `user_profiles`, read only
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn is_admin(&self, user_id: &str) -> AppResult<bool>;
}

/// Reachability probe for the datastore
#[async_trait]
pub trait DatastoreHealth: Send + Sync {
    /// Short backend name for the health document
    fn backend_name(&self) -> &'static str;

    async fn ping(&self) -> AppResult<()>;
}
