//! Payments domain models and types

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Smallest charge the gateway accepts, in minor units (INR 1.00)
pub const MINIMUM_CHARGE_MINOR_UNITS: u64 = 100;

/// Round to two decimal places, halves away from zero (half-up for prices)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Major currency units to the gateway's integer minor units
pub fn to_minor_units(amount: f64) -> u64 {
    (amount * 100.0).round().max(0.0) as u64
}

/// Gateway minor units back to major units
pub fn to_major_units(minor: u64) -> f64 {
    minor as f64 / 100.0
}

/// Free-form notes stored on the gateway's copy of a checkout.
///
/// Verification trusts only the gateway's stored notes, so everything needed to
/// write a booking must be recorded here at checkout time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderNotes(BTreeMap<String, String>);

impl OrderNotes {
    pub const TREK_ID: &'static str = "trekId";
    pub const USER_EMAIL: &'static str = "userEmail";
    pub const USER_NAME: &'static str = "userName";
    pub const USER_ID: &'static str = "userId";
    pub const ORIGINAL_AMOUNT: &'static str = "originalAmount";
    pub const FINAL_AMOUNT: &'static str = "finalAmount";
    pub const DISCOUNT_AMOUNT: &'static str = "discountAmount";
    pub const DISCOUNT_PERCENTAGE: &'static str = "discountPercentage";
    pub const COUPON_CODE: &'static str = "couponCode";

    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    /// Non-empty value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
    }

    pub fn trek_id(&self) -> Option<&str> {
        self.get(Self::TREK_ID)
    }

    pub fn user_email(&self) -> Option<&str> {
        self.get(Self::USER_EMAIL)
    }

    pub fn user_name(&self) -> Option<&str> {
        self.get(Self::USER_NAME)
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.get(Self::COUPON_CODE)
    }

    /// The three notes a booking cannot be written without
    pub fn has_booking_fields(&self) -> bool {
        self.trek_id().is_some() && self.user_email().is_some() && self.user_name().is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for OrderNotes {
    /// The gateway renders empty notes as `[]` and may echo numbers unquoted.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let mut notes = BTreeMap::new();
        match value {
            serde_json::Value::Object(map) => {
                for (key, value) in map {
                    let rendered = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => continue,
                        other => other.to_string(),
                    };
                    notes.insert(key, rendered);
                }
            }
            serde_json::Value::Array(items) if items.is_empty() => {}
            serde_json::Value::Null => {}
            other => {
                return Err(serde::de::Error::custom(format!("unexpected notes shape: {}", other)));
            }
        }
        Ok(OrderNotes(notes))
    }
}

/// Customer shown on the hosted checkout page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutCustomer {
    pub name: String,
    pub email: String,
}

/// Request for a hosted checkout session (payment link)
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentLinkRequest {
    /// Charge in minor units
    pub amount: u64,
    pub currency: String,
    /// Our receipt reference
    pub reference_id: String,
    pub description: String,
    pub customer: CheckoutCustomer,
    pub notes: OrderNotes,
    /// Where the gateway sends the customer afterwards; omitted for local deployments
    pub callback_url: Option<String>,
}

/// Hosted checkout session returned by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub short_url: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Authoritative order record held by the gateway
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Minor units
    pub amount: u64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: OrderNotes,
}
