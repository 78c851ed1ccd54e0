//! Application layer - Use cases and application services
//!
//! Services orchestrate the domain rules against the gateway and datastore ports
//! for checkout, verification and coupon management.

pub mod services;
pub mod use_cases;

pub use services::*;
pub use use_cases::*;
