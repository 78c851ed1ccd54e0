//! End-to-end test suite for the trek booking server
//!
//! Exercises the full route stack against the in-memory datastore and a fake
//! payment gateway:
//! - Checkout and verification scenarios
//! - Coupon validation, generation and admin management
//! - Security behaviour: signatures, bearer tokens, headers and limits

pub mod common;
pub mod integration;
pub mod security;

/// Test configuration and utilities
pub mod config {
    use crate::config::{AppConfig, DatastoreBackend};
    use std::sync::Once;

    pub const TEST_KEY_SECRET: &str = "rzp_test_secret_for_signatures";
    pub const TEST_JWT_SECRET: &str = "test-jwt-secret-with-at-least-32-bytes!";
    pub const ADMIN_USER_ID: &str = "admin-user-1";

    static INIT: Once = Once::new();

    /// Initialize test environment
    pub fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter("warn")
                .with_test_writer()
                .try_init();
        });
    }

    /// Development-mode configuration with gateway credentials and no rate limit
    pub fn test_config() -> AppConfig {
        let mut config = AppConfig::default();

        config.server.port = 3001;
        config.security.development_mode = true;
        config.datastore.backend = DatastoreBackend::Memory;
        config.rate_limit.enabled = false;
        config.razorpay.key_id = "rzp_test_fixture".to_string();
        config.razorpay.key_secret = TEST_KEY_SECRET.to_string();
        config.auth.jwt_secret = TEST_JWT_SECRET.to_string();

        config
    }

    /// Same as [`test_config`] but without gateway credentials
    pub fn unconfigured_gateway_config() -> AppConfig {
        let mut config = test_config();
        config.razorpay.key_id = String::new();
        config.razorpay.key_secret = String::new();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_valid() {
        config::init();
        let test_config = config::test_config();
        assert!(test_config.validate_config().is_ok());
        assert!(crate::config::ConfigValidator::validate_config(&test_config).is_ok());
        assert!(test_config.razorpay.has_credentials());
        assert!(!config::unconfigured_gateway_config().razorpay.has_credentials());
    }
}
