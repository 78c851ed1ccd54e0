//! Routes module
//!
//! One route group per API area, assembled by [`RouteBuilder`].

pub mod admin;
pub mod builder;
pub mod coupons;
pub mod health;
pub mod metrics;
pub mod payments;

pub use admin::AdminRoutes;
pub use builder::RouteBuilder;
pub use coupons::CouponRoutes;
pub use health::HealthRoutes;
pub use metrics::MetricsRoutes;
pub use payments::PaymentRoutes;
