//! Security tests: payment signatures, bearer tokens, headers and request limits

use crate::{
    domain::payments::{GatewayOrder, OrderNotes},
    tests::{
        common::{mint_token_with, sign_payment, TestApp},
        config::{self, TEST_JWT_SECRET},
        fixtures::{self, PAYMENT_ID, TREK_ID},
    },
};
use serde_json::{json, Value};
use warp::http::StatusCode;

mod signatures {
    use super::*;

    #[tokio::test]
    async fn test_scenario_d_bad_signature_books_nothing() {
        let app = TestApp::new();
        app.post("/api/payment/create-order", &fixtures::create_order_body(5000.0)).await;
        let order_id = app.gateway.last_order_id().unwrap();

        let body = json!({
            "orderId": order_id,
            "razorpayPaymentId": PAYMENT_ID,
            "razorpaySignature": "0".repeat(64),
        });
        let (status, body) = app.post("/api/payment/verify", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Payment verification failed");
        assert!(app.store.bookings().await.is_empty());
        assert_eq!(app.metrics.verification_count("signature_mismatch"), 1);
    }

    #[tokio::test]
    async fn test_signature_bound_to_payment_id() {
        let app = TestApp::new();
        app.post("/api/payment/create-order", &fixtures::create_order_body(5000.0)).await;
        let order_id = app.gateway.last_order_id().unwrap();

        let tampered_payment = "pay_AbCdEf12345679";
        let body = json!({
            "orderId": order_id,
            "razorpayPaymentId": tampered_payment,
            "razorpaySignature": sign_payment(&order_id, PAYMENT_ID),
        });
        let (status, body) = app.post("/api/payment/verify", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Payment verification failed");
    }

    #[tokio::test]
    async fn test_malformed_identifiers_rejected_before_crypto() {
        let app = TestApp::new();
        let cases = [
            (json!({}), "Missing required verification fields"),
            (
                json!({ "orderId": "order_short", "razorpayPaymentId": PAYMENT_ID, "razorpaySignature": "a".repeat(64) }),
                "Invalid order ID format",
            ),
            (
                json!({ "orderId": "order_ABCDEFGHIJKLMN", "razorpayPaymentId": "pay_x", "razorpaySignature": "a".repeat(64) }),
                "Invalid payment ID format",
            ),
            (
                json!({ "orderId": "order_ABCDEFGHIJKLMN", "razorpayPaymentId": PAYMENT_ID, "razorpaySignature": "XYZ" }),
                "Invalid signature format",
            ),
        ];

        for (body, expected) in cases {
            let (status, response) = app.post("/api/payment/verify", &body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], expected);
        }
    }

    #[tokio::test]
    async fn test_order_without_booking_notes_is_rejected() {
        let app = TestApp::new();
        let order_id = "order_NOTESMISSING01";
        app.gateway.insert_order(GatewayOrder {
            id: order_id.to_string(),
            amount: 500_000,
            currency: Some("INR".to_string()),
            receipt: None,
            status: Some("paid".to_string()),
            notes: OrderNotes::new().with(OrderNotes::TREK_ID, TREK_ID),
        });

        let body = json!({
            "orderId": order_id,
            "razorpayPaymentId": PAYMENT_ID,
            "razorpaySignature": sign_payment(order_id, PAYMENT_ID),
        });
        let (status, body) = app.post("/api/payment/verify", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Order data verification failed");
        assert!(app.store.bookings().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_order_is_a_service_error() {
        let app = TestApp::new();
        let order_id = "order_DOESNOTEXIST01";
        let body = json!({
            "orderId": order_id,
            "razorpayPaymentId": PAYMENT_ID,
            "razorpaySignature": sign_payment(order_id, PAYMENT_ID),
        });
        let (status, body) = app.post("/api/payment/verify", &body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Payment verification service error");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn test_expired_and_foreign_tokens_are_unauthorized() {
        let app = TestApp::new();
        let body = fixtures::generate_coupon_body("user-1");

        let expired = mint_token_with("user-1", TEST_JWT_SECRET, chrono::Utc::now().timestamp() - 3600);
        let (status, _) = app.post_as("/api/coupon/generate", &body, &expired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let foreign = mint_token_with("user-1", "some-other-project-secret-0123456789", chrono::Utc::now().timestamp() + 3600);
        let (status, body) = app.post_as("/api/coupon/generate", &body, &foreign).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
        assert!(app.store.coupons().await.is_empty());
    }
}

mod transport {
    use super::*;

    #[tokio::test]
    async fn test_error_responses_carry_security_headers() {
        let app = TestApp::new();
        let res = warp::test::request()
            .method("POST")
            .path("/api/coupon/validate")
            .json(&json!({}))
            .reply(&app.routes())
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.headers()["x-content-type-options"], "nosniff");
        assert_eq!(res.headers()["x-frame-options"], "DENY");
        assert_eq!(res.headers()["x-xss-protection"], "1; mode=block");
    }

    #[tokio::test]
    async fn test_unknown_route_and_wrong_method_are_normalized() {
        let app = TestApp::new();
        let routes = app.routes();

        let res = warp::test::request().method("GET").path("/api/nothing-here").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body, json!({ "success": false, "error": "Not found" }));

        let res = warp::test::request().method("GET").path("/api/payment/verify").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_request_body() {
        let app = TestApp::new();
        let res = warp::test::request()
            .method("POST")
            .path("/api/payment/create-order")
            .header("content-type", "application/json")
            .body("{\"trekId\": ")
            .reply(&app.routes())
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let mut test_config = config::test_config();
        test_config.server.max_request_size = 1024;
        let app = TestApp::with_config(test_config);

        let mut body = fixtures::create_order_body(5000.0);
        body["userName"] = json!("x".repeat(4096));
        let res = warp::test::request()
            .method("POST")
            .path("/api/payment/create-order")
            .json(&body)
            .reply(&app.routes())
            .await;

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["success"], false);
        assert!(app.gateway.link_requests().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_client() {
        let mut test_config = config::test_config();
        test_config.rate_limit.enabled = true;
        test_config.rate_limit.requests_per_minute = 2;
        test_config.rate_limit.burst_size = 2;
        let app = TestApp::with_config(test_config);
        let routes = app.routes();

        let send = |ip: &'static str| {
            warp::test::request()
                .method("POST")
                .path("/api/coupon/validate")
                .header("x-forwarded-for", ip)
                .json(&json!({}))
                .reply(&routes)
        };

        assert_eq!(send("203.0.113.1").await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(send("203.0.113.1").await.status(), StatusCode::BAD_REQUEST);

        let limited = send("203.0.113.1").await;
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        let body: Value = serde_json::from_slice(limited.body()).unwrap();
        assert_eq!(body["error"], "Rate limit exceeded. Please slow down.");

        assert_eq!(send("198.51.100.2").await.status(), StatusCode::BAD_REQUEST);

        let res = warp::test::request().method("GET").path("/health").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
