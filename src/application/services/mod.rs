//! Application services - Orchestration of domain logic

pub mod checkout_service;
pub mod coupon_admin_service;
pub mod coupon_service;
pub mod verification_service;

pub use checkout_service::{CheckoutService, CreateOrderRequest, CreateOrderResponse};
pub use coupon_admin_service::{CouponAdminService, CreateCouponRequest};
pub use coupon_service::{CouponService, CouponValidation, GenerateCouponRequest, GeneratedCoupon, ValidateCouponRequest};
pub use verification_service::{VerificationOutcome, VerificationService, VerifyPaymentRequest};
