//! Supabase (PostgREST) datastore adapter
//!
//! Every table is reached through `/rest/v1/<table>` with the service role key.
//! Unique violations come back as HTTP 409 with Postgres code `23505` and are
//! surfaced as `AppError::Conflict` so callers can treat them as collisions.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::app_config::DatastoreConfig;
use crate::domain::bookings::{Booking, NewBooking};
use crate::domain::coupons::{Coupon, NewCoupon, NewCouponUsageLog};
use crate::domain::ports::{BookingRepository, CouponRepository, DatastoreHealth, ProfileRepository};
use crate::shared::error::{AppError, AppResult, SERVICE_UNAVAILABLE};

const COUPONS_TABLE: &str = "coupon_codes";
const USAGE_LOGS_TABLE: &str = "coupon_usage_logs";
const BOOKINGS_TABLE: &str = "bookings";
const PROFILES_TABLE: &str = "user_profiles";
const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST error body
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdminFlag {
    #[serde(default)]
    is_admin: Option<bool>,
}

/// Datastore adapter backed by a Supabase project
pub struct SupabaseStore {
    client: Client,
    rest_url: String,
    service_key: String,
}

impl SupabaseStore {
    pub fn new(config: &DatastoreConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            service_key: config.service_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(&self, table: &str, builder: RequestBuilder) -> AppResult<reqwest::Response> {
        let response = builder.send().await.map_err(|e| {
            error!(table = table, error = %e, "Datastore request failed");
            if e.is_timeout() {
                AppError::Timeout(format!("Datastore request on {} timed out", table))
            } else if e.is_connect() {
                AppError::ServiceUnavailable(SERVICE_UNAVAILABLE.to_string())
            } else {
                AppError::Datastore(format!("Datastore request on {} failed: {}", table, e))
            }
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.json::<PostgrestError>().await.unwrap_or_default();
        let code = body.code.unwrap_or_default();
        let message = body.message.unwrap_or_default();

        if status == StatusCode::CONFLICT || code == UNIQUE_VIOLATION {
            debug!(table = table, code = %code, "Unique constraint violation");
            return Err(AppError::Conflict(format!("Duplicate row in {}: {}", table, message)));
        }

        error!(
            table = table,
            status = status.as_u16(),
            code = %code,
            message = %message,
            details = body.details.as_deref().unwrap_or(""),
            "Datastore returned an error"
        );
        if status == StatusCode::SERVICE_UNAVAILABLE {
            Err(AppError::ServiceUnavailable(SERVICE_UNAVAILABLE.to_string()))
        } else {
            Err(AppError::Datastore(format!("{} on {}: {} {}", status, table, code, message)))
        }
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> AppResult<Vec<T>> {
        let builder = self.request(Method::GET, table).query(query);
        let response = self.send(table, builder).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| AppError::Datastore(format!("Unreadable rows from {}: {}", table, e)))
    }

    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(&self, table: &str, row: &B) -> AppResult<T> {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(row);
        let response = self.send(table, builder).await?;
        let mut rows = response
            .json::<Vec<T>>()
            .await
            .map_err(|e| AppError::Datastore(format!("Unreadable insert result from {}: {}", table, e)))?;
        if rows.is_empty() {
            return Err(AppError::Datastore(format!("Insert into {} returned no row", table)));
        }
        Ok(rows.swap_remove(0))
    }

    fn eq(value: &str) -> String {
        format!("eq.{}", value)
    }
}

#[async_trait]
impl CouponRepository for SupabaseStore {
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Coupon>> {
        let rows: Vec<Coupon> = self
            .select(
                COUPONS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("code", Self::eq(code)),
                    ("is_active", "eq.true".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn code_exists(&self, code: &str) -> AppResult<bool> {
        let rows: Vec<IgnoredAny> = self
            .select(
                COUPONS_TABLE,
                &[("select", "id".to_string()), ("code", Self::eq(code)), ("limit", "1".to_string())],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    async fn insert_coupon(&self, coupon: &NewCoupon) -> AppResult<Coupon> {
        self.insert(COUPONS_TABLE, coupon).await
    }

    async fn insert_usage_log(&self, entry: &NewCouponUsageLog) -> AppResult<()> {
        let builder = self
            .request(Method::POST, USAGE_LOGS_TABLE)
            .header("Prefer", "return=minimal")
            .json(entry);
        self.send(USAGE_LOGS_TABLE, builder).await?;
        Ok(())
    }

    async fn list_coupons(&self) -> AppResult<Vec<Coupon>> {
        self.select(
            COUPONS_TABLE,
            &[("select", "*".to_string()), ("order", "created_at.desc".to_string())],
        )
        .await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Coupon>> {
        let rows: Vec<Coupon> = self
            .select(
                COUPONS_TABLE,
                &[("select", "*".to_string()), ("id", Self::eq(id)), ("limit", "1".to_string())],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn set_active(&self, id: &str, current: bool) -> AppResult<Option<Coupon>> {
        let builder = self
            .request(Method::PATCH, COUPONS_TABLE)
            .query(&[("id", Self::eq(id)), ("is_active", Self::eq(&current.to_string()))])
            .header("Prefer", "return=representation")
            .json(&json!({ "is_active": !current }));
        let response = self.send(COUPONS_TABLE, builder).await?;
        let rows = response
            .json::<Vec<Coupon>>()
            .await
            .map_err(|e| AppError::Datastore(format!("Unreadable update result: {}", e)))?;
        Ok(rows.into_iter().next())
    }

    async fn increment_usage(&self, code: &str) -> AppResult<bool> {
        let path = "rpc/increment_coupon_usage";
        let builder = self.request(Method::POST, path).json(&json!({ "p_code": code }));
        let response = self.send(path, builder).await?;
        response
            .json::<bool>()
            .await
            .map_err(|e| AppError::Datastore(format!("Unreadable increment result: {}", e)))
    }
}

#[async_trait]
impl BookingRepository for SupabaseStore {
    async fn insert_booking(&self, booking: &NewBooking) -> AppResult<Booking> {
        self.insert(BOOKINGS_TABLE, booking).await
    }

    async fn find_by_payment(&self, order_id: &str, payment_id: &str) -> AppResult<Option<Booking>> {
        let rows: Vec<Booking> = self
            .select(
                BOOKINGS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("razorpay_order_id", Self::eq(order_id)),
                    ("razorpay_payment_id", Self::eq(payment_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl ProfileRepository for SupabaseStore {
    async fn is_admin(&self, user_id: &str) -> AppResult<bool> {
        let rows: Vec<AdminFlag> = self
            .select(
                PROFILES_TABLE,
                &[("select", "is_admin".to_string()), ("id", Self::eq(user_id)), ("limit", "1".to_string())],
            )
            .await?;
        Ok(rows.first().and_then(|row| row.is_admin).unwrap_or(false))
    }
}

#[async_trait]
impl DatastoreHealth for SupabaseStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn ping(&self) -> AppResult<()> {
        let _: Vec<IgnoredAny> = self
            .select(COUPONS_TABLE, &[("select", "id".to_string()), ("limit", "1".to_string())])
            .await?;
        Ok(())
    }
}
