//! Admin coupon management handlers

use std::sync::Arc;

use bytes::Bytes;
use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::Reply;

use crate::application::services::{CouponAdminService, CreateCouponRequest};
use crate::infrastructure::adapters::AuthenticationAdapter;
use crate::infrastructure::http::{models::RequestContext, responses::ResponseFormatter, utils::parse_json};
use crate::middleware::{rate_limit::RateLimitMiddleware, security_headers::SecurityHeadersMiddleware};
use crate::shared::error::AppResult;

/// `GET /api/admin/coupons`
pub async fn handle_list_coupons(
    client_ip: String,
    authorization: Option<String>,
    admin: Arc<CouponAdminService>,
    auth: Arc<AuthenticationAdapter>,
    rate_limit: Arc<RateLimitMiddleware>,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let context = RequestContext::new("admin.coupons.list", client_ip);

    let result: AppResult<(StatusCode, Value)> = async {
        rate_limit.check(&context.client_ip)?;
        let identity = auth.authenticate(authorization.as_deref())?;
        let coupons = admin.list(&identity).await?;
        Ok((StatusCode::OK, json!({ "success": true, "coupons": coupons })))
    }
    .await;

    Ok(ResponseFormatter::finish(&context, result, &security))
}

/// `POST /api/admin/coupons`
pub async fn handle_create_coupon(
    body: Bytes,
    client_ip: String,
    authorization: Option<String>,
    admin: Arc<CouponAdminService>,
    auth: Arc<AuthenticationAdapter>,
    rate_limit: Arc<RateLimitMiddleware>,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let context = RequestContext::new("admin.coupons.create", client_ip);

    let result: AppResult<(StatusCode, Value)> = async {
        rate_limit.check(&context.client_ip)?;
        let identity = auth.authenticate(authorization.as_deref())?;
        let request: CreateCouponRequest = parse_json(&body)?;
        let coupon = admin.create(&identity, request).await?;
        Ok((StatusCode::CREATED, json!({ "success": true, "coupon": coupon })))
    }
    .await;

    Ok(ResponseFormatter::finish(&context, result, &security))
}

/// `POST /api/admin/coupons/{id}/toggle`
pub async fn handle_toggle_coupon(
    coupon_id: String,
    client_ip: String,
    authorization: Option<String>,
    admin: Arc<CouponAdminService>,
    auth: Arc<AuthenticationAdapter>,
    rate_limit: Arc<RateLimitMiddleware>,
    security: Arc<SecurityHeadersMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let context = RequestContext::new("admin.coupons.toggle", client_ip);

    let result: AppResult<(StatusCode, Value)> = async {
        rate_limit.check(&context.client_ip)?;
        let identity = auth.authenticate(authorization.as_deref())?;
        let coupon = admin.toggle(&identity, &coupon_id).await?;
        Ok((StatusCode::OK, json!({ "success": true, "coupon": coupon })))
    }
    .await;

    Ok(ResponseFormatter::finish(&context, result, &security))
}
