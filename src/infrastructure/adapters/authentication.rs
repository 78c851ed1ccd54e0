//! Authentication adapter for bearer tokens
//!
//! Session tokens are HS256 JWTs issued by the hosted auth service. They are
//! validated locally against the project secret and audience.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::app_config::AuthConfig;
use crate::domain::identity::Identity;
use crate::shared::error::{AppError, AppResult};

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Resolves `Authorization: Bearer` headers into identities
pub struct AuthenticationAdapter {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthenticationAdapter {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&config.audience]);
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Strip the `Bearer ` scheme from an authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Option<&str> {
        let (scheme, token) = auth_header.trim().split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
    }

    /// Validate a raw JWT
    pub fn validate_token(&self, token: &str) -> AppResult<Identity> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            warn!(error = %e, "Bearer token rejected");
            AppError::from(e)
        })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AppError::Authentication("Token has no subject".to_string()));
        }
        Ok(Identity::new(claims.sub, claims.email))
    }

    /// Resolve the identity behind an optional authorization header
    pub fn authenticate(&self, auth_header: Option<&str>) -> AppResult<Identity> {
        let header = auth_header.ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;
        let token = Self::extract_token_from_header(header)
            .ok_or_else(|| AppError::Authentication("Invalid authorization header".to_string()))?;
        self.validate_token(token)
    }
}
