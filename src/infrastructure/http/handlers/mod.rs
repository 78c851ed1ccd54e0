//! HTTP handlers module
//!
//! Each handler parses its body, dispatches into one application service and
//! renders the outcome through the response formatter.

pub mod admin;
pub mod coupons;
pub mod health;
pub mod metrics;
pub mod payments;

pub use admin::{handle_create_coupon, handle_list_coupons, handle_toggle_coupon};
pub use coupons::{handle_generate_coupon, handle_validate_coupon};
pub use health::handle_health_request;
pub use metrics::handle_prometheus_request;
pub use payments::{handle_create_order, handle_verify_payment};
