//! Razorpay adapter
//!
//! Talks to the Razorpay REST API with basic auth. Only payment-link creation and
//! order lookup are used.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

use crate::config::app_config::RazorpayConfig;
use crate::domain::payments::{CheckoutSession, GatewayOrder, PaymentLinkRequest};
use crate::domain::ports::PaymentGateway;
use crate::shared::error::{AppError, AppResult, PAYMENT_SERVICE_UNAVAILABLE};

/// Razorpay error envelope: `{"error": {"code": ..., "description": ...}}`
#[derive(Debug, Default, Deserialize)]
struct RazorpayErrorBody {
    #[serde(default)]
    error: RazorpayErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct RazorpayErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Adapter for the Razorpay payment gateway
pub struct RazorpayAdapter {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayAdapter {
    /// Build the adapter with a client bounded by the configured timeout
    pub fn new(config: &RazorpayConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn transport_error(operation: &str, err: reqwest::Error) -> AppError {
        error!(operation = operation, error = %err, "Razorpay request failed");
        if err.is_timeout() {
            AppError::Timeout(format!("Razorpay {} timed out", operation))
        } else if err.is_connect() {
            AppError::ServiceUnavailable(PAYMENT_SERVICE_UNAVAILABLE.to_string())
        } else {
            AppError::Gateway(format!("Razorpay {} failed: {}", operation, err))
        }
    }

    async fn status_error(operation: &str, reference: &str, response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.json::<RazorpayErrorBody>().await.unwrap_or_default();
        let code = body.error.code.unwrap_or_else(|| "UNKNOWN".to_string());
        let description = body.error.description.unwrap_or_default();

        error!(
            operation = operation,
            status = status.as_u16(),
            error_code = %code,
            error_description = %description,
            error_reason = body.error.reason.as_deref().unwrap_or(""),
            reference = reference,
            "Razorpay returned an error"
        );

        if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::GATEWAY_TIMEOUT {
            AppError::ServiceUnavailable(PAYMENT_SERVICE_UNAVAILABLE.to_string())
        } else {
            AppError::Gateway(format!("Razorpay {} returned {}: {} {}", operation, status, code, description))
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayAdapter {
    async fn create_payment_link(&self, request: &PaymentLinkRequest) -> AppResult<CheckoutSession> {
        let mut payload = json!({
            "amount": request.amount,
            "currency": request.currency,
            "accept_partial": false,
            "reference_id": request.reference_id,
            "description": request.description,
            "customer": request.customer,
            "notify": { "sms": false, "email": true },
            "reminder_enable": true,
            "notes": request.notes,
        });
        if let Some(callback_url) = &request.callback_url {
            payload["callback_url"] = json!(callback_url);
            payload["callback_method"] = json!("get");
        }

        let response = self
            .client
            .post(self.url("payment_links"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Self::transport_error("create_payment_link", e))?;

        if !response.status().is_success() {
            return Err(Self::status_error("create_payment_link", &request.reference_id, response).await);
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("Unreadable payment link response: {}", e)))?;

        info!(
            payment_link_id = %session.id,
            reference = %request.reference_id,
            amount = request.amount,
            "Payment link created"
        );
        Ok(session)
    }

    async fn fetch_order(&self, order_id: &str) -> AppResult<GatewayOrder> {
        let response = self
            .client
            .get(self.url(&format!("orders/{}", order_id)))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(|e| Self::transport_error("fetch_order", e))?;

        if !response.status().is_success() {
            return Err(Self::status_error("fetch_order", order_id, response).await);
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| AppError::Gateway(format!("Unreadable order response: {}", e)))
    }
}
