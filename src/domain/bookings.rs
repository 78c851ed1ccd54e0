//! Booking domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::payments::{to_major_units, GatewayOrder};

/// Booking status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Payment signature and order verified
    Completed,
}

/// Durable record that a trek was paid for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub trek_id: String,
    pub user_name: String,
    pub user_email: String,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub status: BookingStatus,
    /// Major currency units
    pub amount: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Row written once a payment has been verified
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBooking {
    pub trek_id: String,
    pub user_name: String,
    pub user_email: String,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub status: BookingStatus,
    pub amount: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl NewBooking {
    /// Build a completed booking from the gateway's copy of the order.
    /// Returns `None` when the order notes lack the customer fields.
    pub fn from_verified_order(
        order: &GatewayOrder,
        payment_id: &str,
        signature: &str,
        default_currency: &str,
    ) -> Option<Self> {
        let notes = &order.notes;
        Some(Self {
            trek_id: notes.trek_id()?.to_string(),
            user_name: notes.user_name()?.to_string(),
            user_email: notes.user_email()?.to_string(),
            razorpay_order_id: order.id.clone(),
            razorpay_payment_id: payment_id.to_string(),
            razorpay_signature: signature.to_string(),
            status: BookingStatus::Completed,
            amount: to_major_units(order.amount),
            currency: order
                .currency
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| default_currency.to_string()),
            created_at: Utc::now(),
        })
    }
}
