//! Payment handlers: checkout session creation and payment verification

use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;
use warp::http::StatusCode;
use warp::Reply;

use crate::application::services::{
    CheckoutService, CreateOrderRequest, CreateOrderResponse, VerificationService, VerifyPaymentRequest,
};
use crate::infrastructure::http::{models::RequestContext, responses::ResponseFormatter, utils::parse_json};
use crate::middleware::{rate_limit::RateLimitMiddleware, security_headers::SecurityHeadersMiddleware};
use crate::shared::error::AppResult;

/// `POST /api/payment/create-order`
pub async fn handle_create_order(
    body: Bytes,
    client_ip: String,
    checkout: Arc<CheckoutService>,
    rate_limit: Arc<RateLimitMiddleware>,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let context = RequestContext::new("payment.create_order", client_ip);

    let result: AppResult<(StatusCode, CreateOrderResponse)> = async {
        rate_limit.check(&context.client_ip)?;
        let request: CreateOrderRequest = parse_json(&body)?;
        let session = checkout.create_order(request).await?;
        Ok((StatusCode::OK, session))
    }
    .await;

    Ok(ResponseFormatter::finish(&context, result, &security))
}

/// `POST /api/payment/verify`
pub async fn handle_verify_payment(
    body: Bytes,
    client_ip: String,
    verification: Arc<VerificationService>,
    rate_limit: Arc<RateLimitMiddleware>,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let context = RequestContext::new("payment.verify", client_ip);

    let result: AppResult<(StatusCode, serde_json::Value)> = async {
        rate_limit.check(&context.client_ip)?;
        let request: VerifyPaymentRequest = parse_json(&body)?;
        let outcome = verification.verify(request).await?;
        Ok((
            StatusCode::OK,
            json!({
                "success": true,
                "message": "Payment verified and booking confirmed",
                "booking": outcome.booking,
            }),
        ))
    }
    .await;

    Ok(ResponseFormatter::finish(&context, result, &security))
}
