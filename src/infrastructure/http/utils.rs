//! HTTP utilities - Common helper functions
//!
//! Client IP resolution, body parsing and the filters that inject shared
//! components into route handlers.

use crate::config::AppConfig;
use crate::shared::error::{AppError, AppResult};
use crate::middleware::{rate_limit::RateLimitMiddleware, security_headers::SecurityHeadersMiddleware};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use warp::http::HeaderMap;
use warp::Filter;

const FALLBACK_CLIENT_IP: &str = "127.0.0.1";

/// Pick the client address. `X-Forwarded-For` is only honoured when the
/// deployment declares it a trusted proxy header.
pub fn extract_and_validate_client_ip(
    forwarded_for: Option<&str>,
    remote: Option<SocketAddr>,
    trust_forwarded: bool,
) -> String {
    if trust_forwarded {
        let forwarded = forwarded_for
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .and_then(|value| value.parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| FALLBACK_CLIENT_IP.to_string())
}

fn trusts_forwarded_for(config: &AppConfig) -> bool {
    config
        .security
        .trusted_proxy_headers
        .iter()
        .any(|header| header.eq_ignore_ascii_case("x-forwarded-for"))
}

/// Extract the resolved client IP
pub fn with_client_ip(config: &AppConfig) -> impl Filter<Extract = (String,), Error = Infallible> + Clone {
    let trust_forwarded = trusts_forwarded_for(config);
    warp::header::headers_cloned()
        .and(warp::addr::remote())
        .map(move |headers: HeaderMap, remote: Option<SocketAddr>| {
            let forwarded_for = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok());
            extract_and_validate_client_ip(forwarded_for, remote, trust_forwarded)
        })
}

/// Optional `Authorization` header
pub fn with_authorization() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::header::headers_cloned().map(|headers: HeaderMap| {
        headers
            .get(warp::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    })
}

/// Size-limited raw body. Parsing happens in the handler so malformed JSON
/// gets the standard error shape.
pub fn with_json_body(config: &AppConfig) -> impl Filter<Extract = (bytes::Bytes,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(config.server.max_request_size as u64).and(warp::body::bytes())
}

/// Decode a JSON request body
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| AppError::Json(e.to_string()))
}

/// Helper function to inject a shared component into a route
pub fn with_shared<T>(component: Arc<T>) -> impl Filter<Extract = (Arc<T>,), Error = Infallible> + Clone
where
    T: ?Sized + Send + Sync,
{
    warp::any().map(move || component.clone())
}

/// Helper function to inject rate limiting middleware into route
pub fn with_rate_limit_middleware(
    rate_limit_middleware: Arc<RateLimitMiddleware>,
) -> impl Filter<Extract = (Arc<RateLimitMiddleware>,), Error = Infallible> + Clone {
    with_shared(rate_limit_middleware)
}

/// Helper function to inject security headers middleware into route
pub fn with_security_headers(
    security: Arc<SecurityHeadersMiddleware>,
) -> impl Filter<Extract = (Arc<SecurityHeadersMiddleware>,), Error = Infallible> + Clone {
    with_shared(security)
}
