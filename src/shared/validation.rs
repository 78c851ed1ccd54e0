//! Validation utilities module
//!
//! Field checks shared by the checkout, verification and coupon endpoints.
//! All of them are local and run before any collaborator is called.

use crate::shared::error::AppError;
use regex::Regex;
use std::sync::LazyLock;

static TREK_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid trek id pattern"));
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static ORDER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^order_[A-Za-z0-9]{14}$").expect("valid order id pattern"));
static PAYMENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pay_[A-Za-z0-9]{14}$").expect("valid payment id pattern"));
static SIGNATURE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{64}$").expect("valid signature pattern"));
static COUPON_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9_-]{3,32}$").expect("valid coupon code pattern"));

/// Smallest amount accepted at checkout, in major units
pub const MIN_AMOUNT: f64 = 1.0;
/// Largest amount accepted at checkout, in major units
pub const MAX_AMOUNT: f64 = 1_000_000.0;

const FORBIDDEN_NAME_CHARS: [char; 4] = ['<', '>', '"', '\''];

/// Validation utilities for the application
pub struct ValidationUtils;

impl ValidationUtils {
    /// Trek ids are 1-50 characters of `[A-Za-z0-9_-]`
    pub fn validate_trek_id(trek_id: &str) -> crate::Result<()> {
        let len = trek_id.chars().count();
        if len == 0 || len > 50 || !TREK_ID_PATTERN.is_match(trek_id) {
            return Err(AppError::Validation("Invalid trek ID format".to_string()));
        }
        Ok(())
    }

    /// Amounts are finite and within the checkout range
    pub fn validate_amount(amount: f64) -> crate::Result<()> {
        if !amount.is_finite() || !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
            return Err(AppError::Validation(
                "Invalid amount. Must be between 1 and 1,000,000".to_string()
            ));
        }
        Ok(())
    }

    pub fn validate_email(email: &str) -> crate::Result<()> {
        if email.len() > 254 || !EMAIL_PATTERN.is_match(email) {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }
        Ok(())
    }

    /// Names are 2-100 characters and carry no markup characters
    pub fn validate_user_name(name: &str) -> crate::Result<()> {
        let len = name.chars().count();
        if !(2..=100).contains(&len) || name.contains(FORBIDDEN_NAME_CHARS) {
            return Err(AppError::Validation(
                "Invalid name. Must be 2-100 characters".to_string()
            ));
        }
        Ok(())
    }

    pub fn is_valid_order_id(order_id: &str) -> bool {
        ORDER_ID_PATTERN.is_match(order_id)
    }

    pub fn is_valid_payment_id(payment_id: &str) -> bool {
        PAYMENT_ID_PATTERN.is_match(payment_id)
    }

    /// Signatures are lowercase hex SHA-256 digests
    pub fn is_valid_signature(signature: &str) -> bool {
        SIGNATURE_PATTERN.is_match(signature)
    }

    /// Admin-chosen coupon codes, after uppercasing
    pub fn validate_coupon_code(code: &str) -> crate::Result<()> {
        if !COUPON_CODE_PATTERN.is_match(code) {
            return Err(AppError::Validation(
                "Invalid coupon code. Use 3-32 letters, digits, '-' or '_'".to_string()
            ));
        }
        Ok(())
    }

    /// Trimmed value of an optional field, `None` when blank
    pub fn non_blank(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}
