//! Coupon handlers: public validation and referral generation

use std::sync::Arc;

use bytes::Bytes;
use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::Reply;

use crate::application::services::{CouponService, GenerateCouponRequest, ValidateCouponRequest};
use crate::infrastructure::adapters::AuthenticationAdapter;
use crate::infrastructure::http::{models::RequestContext, responses::ResponseFormatter, utils::parse_json};
use crate::middleware::{rate_limit::RateLimitMiddleware, security_headers::SecurityHeadersMiddleware};
use crate::shared::error::AppResult;

/// `POST /api/coupon/validate`
pub async fn handle_validate_coupon(
    body: Bytes,
    client_ip: String,
    coupons: Arc<CouponService>,
    rate_limit: Arc<RateLimitMiddleware>,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let context = RequestContext::new("coupon.validate", client_ip);

    let result: AppResult<(StatusCode, Value)> = async {
        rate_limit.check(&context.client_ip)?;
        let request: ValidateCouponRequest = parse_json(&body)?;
        let coupon = coupons.validate(request).await?;
        Ok((StatusCode::OK, json!({ "success": true, "coupon": coupon })))
    }
    .await;

    Ok(ResponseFormatter::finish(&context, result, &security))
}

/// `POST /api/coupon/generate`. Field presence is checked before the caller's identity.
pub async fn handle_generate_coupon(
    body: Bytes,
    client_ip: String,
    authorization: Option<String>,
    coupons: Arc<CouponService>,
    auth: Arc<AuthenticationAdapter>,
    rate_limit: Arc<RateLimitMiddleware>,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let context = RequestContext::new("coupon.generate", client_ip);

    let result: AppResult<(StatusCode, Value)> = async {
        rate_limit.check(&context.client_ip)?;
        let request: GenerateCouponRequest = parse_json(&body)?;
        CouponService::require_generation_fields(&request)?;
        let identity = auth.authenticate(authorization.as_deref())?;
        let coupon = coupons.generate(&identity, request).await?;
        Ok((StatusCode::CREATED, json!({ "success": true, "coupon": coupon })))
    }
    .await;

    Ok(ResponseFormatter::finish(&context, result, &security))
}
