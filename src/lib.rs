//! Trek booking server - checkout, payment verification and coupons for
//! Himalayan Runners
//!
//! Customers pay through hosted Razorpay payment links. Returning payments are
//! verified against the gateway before a booking is written, and discount
//! coupons can be validated, minted as referrals and managed by admins.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod middleware;
pub mod shared;

#[cfg(test)]
mod tests;

pub use config::AppConfig;
pub use infrastructure::http::HttpServer;
pub use shared::error::{AppError, AppResult};

/// Application result type
pub type Result<T> = std::result::Result<T, shared::error::AppError>;
