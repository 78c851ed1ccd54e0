//! Application configuration structures
//!
//! This module contains the main configuration structures for the application.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use validator::Validate;

/// Development-only JWT secret; rejected outside development mode.
pub const DEVELOPMENT_JWT_SECRET: &str = "development-only-jwt-secret-change-me-0123456789";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Server address to bind to
    pub bind_address: IpAddr,

    /// Server port
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    /// Maximum request size in bytes
    #[validate(range(min = 1024, max = 10485760))] // 1KB to 10MB
    pub max_request_size: usize,

    /// Public base URL of the site, used for the payment success callback
    #[validate(url)]
    pub public_base_url: Option<String>,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers on every response
    pub enable_security_headers: bool,

    /// Trusted proxy headers
    pub trusted_proxy_headers: Vec<String>,

    /// Development mode - allows the in-memory datastore and development secrets
    pub development_mode: bool,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests per minute per IP
    #[validate(range(min = 1, max = 10000))]
    pub requests_per_minute: u32,

    /// Burst size
    #[validate(range(min = 1, max = 1000))]
    pub burst_size: u32,

    /// Enable rate limiting
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    #[validate(length(min = 1))]
    pub level: String,

    /// Log format ("json" or "text")
    #[validate(length(min = 1))]
    pub format: String,
}

/// Payment gateway configuration
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RazorpayConfig {
    /// Gateway REST base URL
    #[validate(url)]
    pub api_base_url: String,

    /// Public key id (basic auth user)
    pub key_id: String,

    /// Key secret, also the HMAC key for payment signatures
    pub key_secret: String,

    /// ISO currency code used for checkout sessions
    #[validate(length(equal = 3))]
    pub currency: String,

    /// Display name shown on the hosted checkout page
    #[validate(length(min = 1, max = 100))]
    pub business_name: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64,
}

impl RazorpayConfig {
    /// Both halves of the credential pair are present
    pub fn has_credentials(&self) -> bool {
        !self.key_id.trim().is_empty() && !self.key_secret.trim().is_empty()
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("api_base_url", &self.api_base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("currency", &self.currency)
            .field("business_name", &self.business_name)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Datastore backend selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreBackend {
    /// Hosted PostgREST endpoint
    Supabase,
    /// Process-local store, development and tests only
    Memory,
}

/// Hosted datastore configuration
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatastoreConfig {
    pub backend: DatastoreBackend,

    /// Project URL, e.g. https://<project>.supabase.co
    pub url: String,

    /// Service role key sent as `apikey` and bearer token
    pub service_key: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 120))]
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for DatastoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatastoreConfig")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Authentication configuration
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT secret of the hosted auth service
    #[validate(length(min = 32))]
    pub jwt_secret: String,

    /// Expected token audience
    #[validate(length(min = 1))]
    pub audience: String,

    /// Admin user ids for the in-memory datastore
    pub admin_user_ids: Vec<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("audience", &self.audience)
            .field("admin_user_ids", &self.admin_user_ids)
            .finish()
    }
}

/// Coupon configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CouponConfig {
    /// Discount granted by referral coupons minted after a booking
    #[validate(range(min = 1, max = 100))]
    pub referral_discount_percentage: u8,

    /// Use cap of referral coupons
    #[validate(range(min = 1))]
    pub referral_max_uses: u32,

    /// Validity window of referral coupons in days
    #[validate(range(min = 1, max = 3650))]
    pub referral_validity_days: u32,

    /// Validity window of admin coupons created without an explicit expiry
    #[validate(range(min = 1, max = 3650))]
    pub default_validity_days: u32,

    /// Attempts at finding an unused referral code
    #[validate(range(min = 1, max = 10))]
    pub generation_attempts: u32,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Security configuration
    pub security: SecurityConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Payment gateway configuration
    pub razorpay: RazorpayConfig,

    /// Hosted datastore configuration
    pub datastore: DatastoreConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Coupon configuration
    pub coupons: CouponConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            max_request_size: 64 * 1024, // 64KB
            public_base_url: None,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_security_headers: true,
            trusted_proxy_headers: vec!["X-Forwarded-For".to_string()],
            development_mode: false,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 120,
            burst_size: 20,
            enabled: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.razorpay.com/v1".to_string(),
            key_id: String::new(),
            key_secret: String::new(),
            currency: "INR".to_string(),
            business_name: "Himalayan Runners".to_string(),
            timeout_seconds: 15,
        }
    }
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            backend: DatastoreBackend::Supabase,
            url: "http://127.0.0.1:54321".to_string(),
            service_key: String::new(),
            timeout_seconds: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            audience: "authenticated".to_string(),
            admin_user_ids: vec![],
        }
    }
}

impl Default for CouponConfig {
    fn default() -> Self {
        Self {
            referral_discount_percentage: 10,
            referral_max_uses: 999,
            referral_validity_days: 365,
            default_validity_days: 365,
            generation_attempts: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the optional `Conf` file and environment variables
    pub fn load() -> crate::Result<Self> {
        let defaults = config::Config::try_from(&AppConfig::default())?;

        let config = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("Conf").required(false))
            .add_source(config::Environment::with_prefix("TREK_BOOKING").separator("__"))
            .build()
            .map_err(|e| crate::shared::error::AppError::Config(format!("Failed to build configuration: {}", e)))?;

        let mut config: AppConfig = config.try_deserialize()
            .map_err(|e| crate::shared::error::AppError::Config(format!("Failed to deserialize configuration: {}", e)))?;

        config.apply_credential_fallbacks(|name| std::env::var(name).ok());

        // Validate configuration
        config.validate_config()
            .map_err(|e| crate::shared::error::AppError::Validation(format!("Configuration validation failed: {}", e)))?;
        crate::config::ConfigValidator::validate_config(&config)?;

        Ok(config)
    }

    /// Fill gateway credentials from the conventional variable names when the
    /// prefixed ones are absent. The first non-empty candidate wins.
    pub fn apply_credential_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        if self.razorpay.key_id.trim().is_empty() {
            if let Some(id) = first(&["RAZORPAY_KEY_ID", "NEXT_PUBLIC_RAZORPAY_KEY_ID"]) {
                self.razorpay.key_id = id;
            }
        }
        if self.razorpay.key_secret.trim().is_empty() {
            if let Some(secret) = first(&["RAZORPAY_KEY_SECRET"]) {
                self.razorpay.key_secret = secret;
            }
        }
    }

    /// Validate the entire configuration
    pub fn validate_config(&self) -> Result<(), validator::ValidationErrors> {
        self.server.validate()?;
        self.security.validate()?;
        self.rate_limit.validate()?;
        self.logging.validate()?;
        self.razorpay.validate()?;
        self.datastore.validate()?;
        self.auth.validate()?;
        self.coupons.validate()?;

        Ok(())
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}
