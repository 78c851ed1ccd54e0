//! Configuration validation module
//!
//! This module provides additional validation logic for configuration
//! beyond the basic validator crate validation.

use crate::config::app_config::{AppConfig, DatastoreBackend, DatastoreConfig, DEVELOPMENT_JWT_SECRET};
use crate::shared::error::AppError;

/// Configuration validator for cross-field rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the complete configuration
    pub fn validate_config(config: &AppConfig) -> crate::Result<()> {
        Self::validate_datastore(&config.datastore, config.security.development_mode)?;

        if !config.security.development_mode && config.auth.jwt_secret == DEVELOPMENT_JWT_SECRET {
            return Err(AppError::Validation(
                "The development JWT secret cannot be used outside development mode".to_string()
            ));
        }

        if let Some(base) = &config.server.public_base_url {
            Self::validate_http_url("Public base URL", base)?;
        }

        if !config.razorpay.has_credentials() {
            tracing::warn!("Payment gateway credentials are not configured; checkout and verification will answer 503");
        }

        Ok(())
    }

    /// Validate datastore settings
    fn validate_datastore(datastore: &DatastoreConfig, development_mode: bool) -> crate::Result<()> {
        match datastore.backend {
            DatastoreBackend::Memory => {
                if !development_mode {
                    return Err(AppError::Validation(
                        "The in-memory datastore is only allowed in development mode".to_string()
                    ));
                }
                Ok(())
            }
            DatastoreBackend::Supabase => {
                Self::validate_http_url("Datastore URL", &datastore.url)?;

                if !Self::is_local(&datastore.url) && !datastore.url.starts_with("https://") {
                    return Err(AppError::Validation(
                        "Production datastore URL must use HTTPS".to_string()
                    ));
                }

                if datastore.service_key.trim().is_empty() {
                    return Err(AppError::Validation(
                        "Datastore service key is required".to_string()
                    ));
                }
                Ok(())
            }
        }
    }

    fn validate_http_url(label: &str, url: &str) -> crate::Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Validation(
                format!("{} must start with http:// or https://", label)
            ));
        }
        Ok(())
    }

    fn is_local(url: &str) -> bool {
        url.contains("localhost") || url.contains("127.0.0.1")
    }
}
