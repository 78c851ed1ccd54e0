//! Domain layer - Core business logic and domain models
//!
//! Bookings, coupons, checkout sessions and the signature rules that tie them
//! together, independent of HTTP and of the concrete gateway and datastore.

pub mod bookings;
pub mod coupons;
pub mod health;
pub mod identity;
pub mod payments;
pub mod ports;
pub mod security;

pub use bookings::{Booking, BookingStatus, NewBooking};
pub use coupons::{
    CodeSuffixSource, Coupon, CouponDiscount, CouponRejection, NewCoupon, NewCouponUsageLog,
    RandomSuffixSource,
};
pub use health::{HealthResponse, HealthStatus};
pub use identity::Identity;
pub use payments::{CheckoutCustomer, CheckoutSession, GatewayOrder, OrderNotes, PaymentLinkRequest};
pub use ports::{BookingRepository, CouponRepository, DatastoreHealth, PaymentGateway, ProfileRepository};
pub use security::PaymentSignatureVerifier;
