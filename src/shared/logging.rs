//! Logging utilities module
//!
//! This module provides centralized logging functionality and utilities.

use crate::config::app_config::LoggingConfig;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

/// Logging utilities for the application
pub struct LoggingUtils;

impl LoggingUtils {
    /// Initialize the global subscriber. `RUST_LOG` overrides the configured level.
    pub fn initialize(config: &LoggingConfig) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.level));

        let builder = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let result = if config.format.eq_ignore_ascii_case("json") {
            tracing::subscriber::set_global_default(builder.json().finish())
        } else {
            tracing::subscriber::set_global_default(builder.finish())
        };

        result.map_err(|e| crate::shared::error::AppError::Internal(format!("Failed to initialize logging: {}", e)))
    }

    /// Log an incoming request
    pub fn log_request(request_id: &str, endpoint: &str, client_ip: &str) {
        info!(
            request_id = %request_id,
            endpoint = %endpoint,
            client_ip = %client_ip,
            "Processing request"
        );
    }

    /// Log a successful response
    pub fn log_success(request_id: &str, endpoint: &str, duration_ms: u64) {
        info!(
            request_id = %request_id,
            endpoint = %endpoint,
            duration_ms = %duration_ms,
            "Request completed successfully"
        );
    }

    /// Log an error response. Client errors are expected traffic and logged at warn.
    pub fn log_error(request_id: &str, endpoint: &str, error: &crate::shared::error::AppError, duration_ms: u64) {
        if error.http_status_code().is_server_error() {
            error!(
                request_id = %request_id,
                endpoint = %endpoint,
                error = %error,
                duration_ms = %duration_ms,
                "Request failed"
            );
        } else {
            warn!(
                request_id = %request_id,
                endpoint = %endpoint,
                error = %error,
                duration_ms = %duration_ms,
                "Request rejected"
            );
        }
    }

    /// Log security events
    pub fn log_security_event(event_type: &str, details: &str) {
        warn!(
            event_type = %event_type,
            details = %details,
            "Security event detected"
        );
    }

    /// Log rate limiting events
    pub fn log_rate_limit(client_ip: &str, limit: u32) {
        warn!(
            client_ip = %client_ip,
            limit = %limit,
            "Rate limit exceeded"
        );
    }

    /// Generate a unique request ID
    pub fn generate_request_id() -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();

        format!("req_{:x}", now)
    }
}
