//! Common test utilities and fakes
//!
//! A recording payment gateway, deterministic code suffixes, bearer token
//! minting and a harness that serves the full route stack.

use crate::{
    config::AppConfig,
    domain::{
        coupons::{CodeSuffixSource, Coupon, NewCoupon, NewCouponUsageLog},
        payments::{CheckoutSession, GatewayOrder, PaymentLinkRequest},
        ports::{CouponRepository, PaymentGateway},
        security::hmac_sha256_hex,
    },
    infrastructure::{
        adapters::{MemoryStore, Repositories, SessionClaims},
        http::{models::ApiServices, routes::RouteBuilder},
    },
    shared::{
        error::{AppError, AppResult},
        metrics::AppMetrics,
    },
    tests::config::{self, ADMIN_USER_ID, TEST_JWT_SECRET, TEST_KEY_SECRET},
};
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;

/// In-process gateway that records payment link requests and keeps an order
/// per link, carrying the notes it was created with
#[derive(Default)]
pub struct FakeGateway {
    link_requests: Mutex<Vec<PaymentLinkRequest>>,
    orders: Mutex<HashMap<String, GatewayOrder>>,
    order_ids: Mutex<Vec<String>>,
    fail_links: AtomicBool,
    counter: AtomicU64,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every payment link creation fail like a gateway 4xx
    pub fn fail_payment_links(&self) {
        self.fail_links.store(true, Ordering::SeqCst);
    }

    pub fn link_requests(&self) -> Vec<PaymentLinkRequest> {
        self.link_requests.lock().unwrap().clone()
    }

    pub fn last_order_id(&self) -> Option<String> {
        self.order_ids.lock().unwrap().last().cloned()
    }

    /// Register an order directly, bypassing checkout
    pub fn insert_order(&self, order: GatewayOrder) {
        self.order_ids.lock().unwrap().push(order.id.clone());
        self.orders.lock().unwrap().insert(order.id.clone(), order);
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_link(&self, request: &PaymentLinkRequest) -> AppResult<CheckoutSession> {
        if self.fail_links.load(Ordering::SeqCst) {
            return Err(AppError::Gateway("BAD_REQUEST_ERROR: simulated rejection".to_string()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.insert_order(GatewayOrder {
            id: format!("order_{:014}", n),
            amount: request.amount,
            currency: Some(request.currency.clone()),
            receipt: Some(request.reference_id.clone()),
            status: Some("created".to_string()),
            notes: request.notes.clone(),
        });
        self.link_requests.lock().unwrap().push(request.clone());

        Ok(CheckoutSession {
            id: format!("plink_{:014}", n),
            short_url: format!("https://rzp.io/i/test{}", n),
            amount: request.amount,
            currency: Some(request.currency.clone()),
            status: Some("created".to_string()),
        })
    }

    async fn fetch_order(&self, order_id: &str) -> AppResult<GatewayOrder> {
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| AppError::Gateway(format!("BAD_REQUEST_ERROR: order {} does not exist", order_id)))
    }
}

/// Coupon table over a [`MemoryStore`] that can misbehave the way a shared
/// datastore does under concurrent writers
pub struct RacyCoupons {
    pub store: MemoryStore,
    insert_conflicts: AtomicU32,
    stale_reads: AtomicBool,
}

impl RacyCoupons {
    pub fn new(store: MemoryStore) -> Self {
        Self { store, insert_conflicts: AtomicU32::new(0), stale_reads: AtomicBool::new(false) }
    }

    /// The next `count` inserts hit a unique violation even though the
    /// existence check just passed
    pub fn conflict_next_inserts(self, count: u32) -> Self {
        self.insert_conflicts.store(count, Ordering::SeqCst);
        self
    }

    /// Reads by id report the opposite `is_active`, as if another writer
    /// flipped it right after
    pub fn stale_reads(self) -> Self {
        self.stale_reads.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl CouponRepository for RacyCoupons {
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Coupon>> {
        self.store.find_active_by_code(code).await
    }

    async fn code_exists(&self, code: &str) -> AppResult<bool> {
        if self.insert_conflicts.load(Ordering::SeqCst) > 0 {
            return Ok(false);
        }
        self.store.code_exists(code).await
    }

    async fn insert_coupon(&self, coupon: &NewCoupon) -> AppResult<Coupon> {
        let remaining = self.insert_conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.insert_conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::Conflict(format!("Duplicate coupon code {}", coupon.code)));
        }
        self.store.insert_coupon(coupon).await
    }

    async fn insert_usage_log(&self, entry: &NewCouponUsageLog) -> AppResult<()> {
        self.store.insert_usage_log(entry).await
    }

    async fn list_coupons(&self) -> AppResult<Vec<Coupon>> {
        self.store.list_coupons().await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Coupon>> {
        let coupon = self.store.find_by_id(id).await?;
        if !self.stale_reads.load(Ordering::SeqCst) {
            return Ok(coupon);
        }
        Ok(coupon.map(|c| Coupon { is_active: !c.is_active, ..c }))
    }

    async fn set_active(&self, id: &str, current: bool) -> AppResult<Option<Coupon>> {
        self.store.set_active(id, current).await
    }

    async fn increment_usage(&self, code: &str) -> AppResult<bool> {
        self.store.increment_usage(code).await
    }
}

/// Suffixes handed out in order, repeating the last one when exhausted
pub struct SequenceSuffixes {
    suffixes: Vec<&'static str>,
    next: AtomicU64,
}

impl SequenceSuffixes {
    pub fn new(suffixes: Vec<&'static str>) -> Self {
        Self { suffixes, next: AtomicU64::new(0) }
    }

    /// The same suffix every time
    pub fn constant(suffix: &'static str) -> Self {
        Self::new(vec![suffix])
    }
}

impl CodeSuffixSource for SequenceSuffixes {
    fn next_suffix(&self) -> String {
        let index = self.next.fetch_add(1, Ordering::SeqCst) as usize;
        self.suffixes[index.min(self.suffixes.len() - 1)].to_string()
    }
}

/// HS256 session token for `user_id`, valid for an hour
pub fn mint_token(user_id: &str) -> String {
    mint_token_with(user_id, TEST_JWT_SECRET, chrono::Utc::now().timestamp() + 3600)
}

pub fn mint_token_with(user_id: &str, secret: &str, exp: i64) -> String {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        aud: "authenticated".to_string(),
        exp: exp as usize,
        email: Some(format!("{}@example.com", user_id)),
        role: Some("authenticated".to_string()),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

/// Signature the gateway would hand the browser for this payment
pub fn sign_payment(order_id: &str, payment_id: &str) -> String {
    hmac_sha256_hex(TEST_KEY_SECRET.as_bytes(), format!("{}|{}", order_id, payment_id).as_bytes())
}

/// Full application wired onto the in-memory store and a fake gateway
pub struct TestApp {
    pub config: AppConfig,
    pub store: MemoryStore,
    pub gateway: Arc<FakeGateway>,
    pub metrics: AppMetrics,
    services: ApiServices,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(config::test_config(), true, Arc::new(SequenceSuffixes::new(vec!["A1B2C3", "D4E5F6", "0A0B0C"])))
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, true, Arc::new(SequenceSuffixes::constant("A1B2C3")))
    }

    pub fn with_suffixes(suffixes: SequenceSuffixes) -> Self {
        Self::build(config::test_config(), true, Arc::new(suffixes))
    }

    /// No gateway credentials: payment endpoints answer 503
    pub fn without_gateway() -> Self {
        Self::build(
            config::unconfigured_gateway_config(),
            false,
            Arc::new(SequenceSuffixes::constant("A1B2C3")),
        )
    }

    fn build(config: AppConfig, with_gateway: bool, suffixes: Arc<dyn CodeSuffixSource>) -> Self {
        config::init();
        let store = MemoryStore::with_admins([ADMIN_USER_ID]);
        let gateway = Arc::new(FakeGateway::new());
        let metrics = AppMetrics::new().unwrap();

        let gateway_port: Option<Arc<dyn PaymentGateway>> = with_gateway.then(|| gateway.clone() as Arc<dyn PaymentGateway>);
        let services = ApiServices::assemble(
            &config,
            Repositories::from_store(Arc::new(store.clone())),
            gateway_port,
            suffixes,
            metrics.clone(),
        );

        Self { config, store, gateway, metrics, services }
    }

    pub fn routes(&self) -> impl warp::Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        RouteBuilder::build_routes(&self.config, self.services.clone())
    }

    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let res = warp::test::request()
            .method("POST")
            .path(path)
            .json(body)
            .reply(&self.routes())
            .await;
        (res.status(), parse_body(res.body()))
    }

    pub async fn post_as(&self, path: &str, body: &Value, token: &str) -> (StatusCode, Value) {
        let res = warp::test::request()
            .method("POST")
            .path(path)
            .header("authorization", format!("Bearer {}", token))
            .json(body)
            .reply(&self.routes())
            .await;
        (res.status(), parse_body(res.body()))
    }

    pub async fn get_as(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let res = warp::test::request()
            .method("GET")
            .path(path)
            .header("authorization", format!("Bearer {}", token))
            .reply(&self.routes())
            .await;
        (res.status(), parse_body(res.body()))
    }

    /// Verify the most recent checkout with a correctly signed payment
    pub async fn verify_last_order(&self, payment_id: &str) -> (StatusCode, Value) {
        let order_id = self.gateway.last_order_id().expect("a checkout was created");
        let body = serde_json::json!({
            "orderId": order_id,
            "razorpayPaymentId": payment_id,
            "razorpaySignature": sign_payment(&order_id, payment_id),
        });
        self.post("/api/payment/verify", &body).await
    }
}

fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_suffixes_repeat_last() {
        let suffixes = SequenceSuffixes::new(vec!["AAAAAA", "BBBBBB"]);
        assert_eq!(suffixes.next_suffix(), "AAAAAA");
        assert_eq!(suffixes.next_suffix(), "BBBBBB");
        assert_eq!(suffixes.next_suffix(), "BBBBBB");
    }

    #[tokio::test]
    async fn test_fake_gateway_orders_match_verification_format() {
        let gateway = FakeGateway::new();
        let request = crate::tests::fixtures::payment_link_request(450_000);
        let session = gateway.create_payment_link(&request).await.unwrap();

        let order_id = gateway.last_order_id().unwrap();
        assert!(crate::shared::validation::ValidationUtils::is_valid_order_id(&order_id));
        assert!(session.id.starts_with("plink_"));

        let order = gateway.fetch_order(&order_id).await.unwrap();
        assert_eq!(order.amount, 450_000);
        assert_eq!(order.notes, request.notes);
    }
}
