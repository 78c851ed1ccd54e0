//! Integration tests for the booking flows
//!
//! Every test drives the real route stack; only the gateway is faked.

use crate::tests::{
    common::{mint_token, SequenceSuffixes, TestApp},
    config::ADMIN_USER_ID,
    fixtures::{self, PAYMENT_ID, TREK_ID},
};
use serde_json::json;
use warp::http::StatusCode;

mod checkout_and_verification {
    use super::*;

    #[tokio::test]
    async fn test_scenario_a_full_price_booking() {
        let app = TestApp::new();

        let (status, body) = app.post("/api/payment/create-order", &fixtures::create_order_body(5000.0)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["originalAmount"], 5000.0);
        assert_eq!(body["finalAmount"], 5000.0);
        assert_eq!(body["discountAmount"], 0.0);
        assert_eq!(body["couponApplied"], false);
        assert!(body["short_url"].as_str().unwrap().starts_with("https://rzp.io/"));

        let links = app.gateway.link_requests();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].amount, 500_000);
        assert_eq!(links[0].currency, "INR");
        assert_eq!(links[0].notes.trek_id(), Some(TREK_ID));
        assert_eq!(links[0].notes.coupon_code(), None);

        let (status, body) = app.verify_last_order(PAYMENT_ID).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Payment verified and booking confirmed");
        assert_eq!(body["booking"]["amount"], 5000.0);
        assert_eq!(body["booking"]["status"], "completed");
        assert_eq!(body["booking"]["currency"], "INR");
        assert_eq!(body["booking"]["user_email"], fixtures::USER_EMAIL);

        assert_eq!(app.store.bookings().await.len(), 1);
    }

    #[tokio::test]
    async fn test_scenario_b_discounted_booking_counts_coupon_use() {
        let app = TestApp::new();
        app.store.seed_coupon(fixtures::coupon("SAVE10", 10)).await;

        let (status, body) = app
            .post("/api/payment/create-order", &fixtures::create_order_body_with_coupon(5000.0, "save10"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discountAmount"], 500.0);
        assert_eq!(body["finalAmount"], 4500.0);
        assert_eq!(body["couponApplied"], true);

        let links = app.gateway.link_requests();
        assert_eq!(links[0].amount, 450_000);
        assert_eq!(links[0].notes.coupon_code(), Some("SAVE10"));

        let (status, body) = app.verify_last_order(PAYMENT_ID).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["booking"]["amount"], 4500.0);

        let coupon = app.store.coupon_by_code("SAVE10").await.unwrap();
        assert_eq!(coupon.current_uses, 1);
    }

    #[tokio::test]
    async fn test_scenario_c_expired_coupon_creates_no_order() {
        let app = TestApp::new();
        app.store.seed_coupon(fixtures::expired_coupon("OLD20", 20)).await;

        let (status, body) = app
            .post("/api/payment/create-order", &fixtures::create_order_body_with_coupon(5000.0, "OLD20"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Coupon code has expired");
        assert!(app.gateway.link_requests().is_empty());
    }

    #[tokio::test]
    async fn test_discount_below_minimum_charge_creates_no_order() {
        let app = TestApp::new();
        app.store.seed_coupon(fixtures::coupon("FREE100", 100)).await;
        app.store.seed_coupon(fixtures::coupon("NEARLY95", 95)).await;

        let (status, body) = app
            .post("/api/payment/create-order", &fixtures::create_order_body_with_coupon(5000.0, "FREE100"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Final amount after discount must be at least 1.00");

        let (status, _) = app
            .post("/api/payment/create-order", &fixtures::create_order_body_with_coupon(10.0, "NEARLY95"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.gateway.link_requests().is_empty());

        let (status, body) = app
            .post("/api/payment/create-order", &fixtures::create_order_body_with_coupon(20.0, "NEARLY95"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["finalAmount"], 1.0);
        assert_eq!(app.gateway.link_requests()[0].amount, 100);
    }

    #[tokio::test]
    async fn test_repeated_verification_writes_one_booking() {
        let app = TestApp::new();
        app.store.seed_coupon(fixtures::coupon("SAVE10", 10)).await;
        app.post("/api/payment/create-order", &fixtures::create_order_body_with_coupon(5000.0, "SAVE10"))
            .await;

        let (first_status, first) = app.verify_last_order(PAYMENT_ID).await;
        let (second_status, second) = app.verify_last_order(PAYMENT_ID).await;

        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(first["booking"]["id"], second["booking"]["id"]);
        assert_eq!(app.store.bookings().await.len(), 1);
        assert_eq!(app.store.coupon_by_code("SAVE10").await.unwrap().current_uses, 1);
    }

    #[tokio::test]
    async fn test_concurrent_verifications_write_one_booking() {
        let app = TestApp::new();
        app.post("/api/payment/create-order", &fixtures::create_order_body(5000.0)).await;

        let (a, b, c) = tokio::join!(
            app.verify_last_order(PAYMENT_ID),
            app.verify_last_order(PAYMENT_ID),
            app.verify_last_order(PAYMENT_ID),
        );
        for (status, _) in [a, b, c] {
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(app.store.bookings().await.len(), 1);
    }

    #[tokio::test]
    async fn test_coupon_at_cap_still_books() {
        let app = TestApp::new();
        app.store.seed_coupon(fixtures::capped_coupon("LAST1", 10, 1, 0)).await;
        app.post("/api/payment/create-order", &fixtures::create_order_body_with_coupon(5000.0, "LAST1"))
            .await;

        // Another booking uses the last slot between checkout and verification
        app.store.seed_coupon(fixtures::capped_coupon("LAST1", 10, 1, 1)).await;

        let (status, _) = app.verify_last_order(PAYMENT_ID).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.store.coupon_by_code("LAST1").await.unwrap().current_uses, 1);
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_before_gateway() {
        let app = TestApp::new();
        let body = json!({ "trekId": TREK_ID, "amount": 5000 });

        let (status, body) = app.post("/api/payment/create-order", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: trekId, amount, userEmail, userName");
        assert!(app.gateway.link_requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_inputs_have_specific_messages() {
        let app = TestApp::new();

        let mut body = fixtures::create_order_body(5000.0);
        body["userEmail"] = json!("not-an-email");
        let (_, response) = app.post("/api/payment/create-order", &body).await;
        assert_eq!(response["error"], "Invalid email address");

        let (_, response) = app.post("/api/payment/create-order", &fixtures::create_order_body(2_000_000.0)).await;
        assert_eq!(response["error"], "Invalid amount. Must be between 1 and 1,000,000");

        let mut body = fixtures::create_order_body(5000.0);
        body["trekId"] = json!("everest base camp");
        let (_, response) = app.post("/api/payment/create-order", &body).await;
        assert_eq!(response["error"], "Invalid trek ID format");
    }

    #[tokio::test]
    async fn test_gateway_failure_is_generic() {
        let app = TestApp::new();
        app.gateway.fail_payment_links();

        let (status, body) = app.post("/api/payment/create-order", &fixtures::create_order_body(5000.0)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(!body["error"].as_str().unwrap().contains("BAD_REQUEST_ERROR"));
    }

    #[tokio::test]
    async fn test_unconfigured_gateway_answers_503() {
        let app = TestApp::without_gateway();

        let (status, body) = app.post("/api/payment/create-order", &fixtures::create_order_body(5000.0)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Payment service unavailable. Please contact support.");

        let (status, _) = app.post("/api/payment/verify", &json!({})).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_metrics_count_verification_outcomes() {
        let app = TestApp::new();
        app.post("/api/payment/create-order", &fixtures::create_order_body(5000.0)).await;
        app.verify_last_order(PAYMENT_ID).await;
        app.verify_last_order(PAYMENT_ID).await;

        let res = warp::test::request().method("GET").path("/metrics").reply(&app.routes()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let text = std::str::from_utf8(res.body()).unwrap();
        assert!(text.contains("payment_verifications_total{outcome=\"booked\"} 1"));
        assert!(text.contains("payment_verifications_total{outcome=\"duplicate\"} 1"));
        assert!(text.contains("checkout_sessions_total{outcome=\"created\"} 1"));
    }
}

mod coupons {
    use super::*;

    #[tokio::test]
    async fn test_validate_prices_coupon() {
        let app = TestApp::new();
        app.store.seed_coupon(fixtures::coupon("SAVE10", 10)).await;

        let body = json!({ "couponCode": "save10", "amount": 5000, "trekId": TREK_ID });
        let (status, body) = app.post("/api/coupon/validate", &body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["coupon"]["code"], "SAVE10");
        assert_eq!(body["coupon"]["discountPercentage"], 10);
        assert_eq!(body["coupon"]["discountAmount"], 500.0);
        assert_eq!(body["coupon"]["finalAmount"], 4500.0);
        assert_eq!(body["coupon"]["originalAmount"], 5000.0);
    }

    #[tokio::test]
    async fn test_validate_reports_rejection_reasons() {
        let app = TestApp::new();
        app.store.seed_coupon(fixtures::capped_coupon("FULL", 10, 3, 3)).await;

        let (status, body) = app
            .post("/api/coupon/validate", &json!({ "couponCode": "FULL", "amount": 5000, "trekId": TREK_ID }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Coupon code has reached maximum uses");

        let (_, body) = app
            .post("/api/coupon/validate", &json!({ "couponCode": "NOPE", "amount": 5000, "trekId": TREK_ID }))
            .await;
        assert_eq!(body["error"], "Invalid or inactive coupon code");

        let (_, body) = app.post("/api/coupon/validate", &json!({ "couponCode": "FULL" })).await;
        assert_eq!(body["error"], "Missing required fields: couponCode, amount, trekId");
    }

    #[tokio::test]
    async fn test_generate_requires_fields_then_identity() {
        let app = TestApp::new();

        let (status, body) = app.post("/api/coupon/generate", &json!({ "userId": "user-1" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: userId, trekId, paymentId, amount");

        let (status, body) = app.post("/api/coupon/generate", &fixtures::generate_coupon_body("user-1")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_generate_mints_trek_scoped_referral() {
        let app = TestApp::new();
        let token = mint_token("user-1");

        let (status, body) = app
            .post_as("/api/coupon/generate", &fixtures::generate_coupon_body("user-1"), &token)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["coupon"]["code"], "TREKEVERA1B2C3");
        assert_eq!(body["coupon"]["discountPercentage"], 10);
        assert_eq!(body["coupon"]["validFor"], TREK_ID);
        assert!(body["coupon"]["expiryDate"].is_string());

        let stored = app.store.coupon_by_code("TREKEVERA1B2C3").await.unwrap();
        assert_eq!(stored.max_uses, Some(999));
        assert_eq!(stored.created_by.as_deref(), Some("user-1"));
        assert_eq!(stored.trek_ids, Some(vec![TREK_ID.to_string()]));
        assert_eq!(app.store.usage_logs().await.len(), 1);

        // Referral coupons only apply to the trek they were minted for
        let mut other_trek = fixtures::create_order_body_with_coupon(5000.0, "TREKEVERA1B2C3");
        other_trek["trekId"] = json!("annapurna-circuit");
        let (status, body) = app.post("/api/payment/create-order", &other_trek).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "This coupon is not valid for this trek");
    }

    #[tokio::test]
    async fn test_generate_retries_past_a_collision() {
        let app = TestApp::with_suffixes(SequenceSuffixes::new(vec!["A1B2C3", "D4E5F6"]));
        app.store.seed_coupon(fixtures::coupon("TREKEVERA1B2C3", 10)).await;

        let (status, body) = app
            .post_as("/api/coupon/generate", &fixtures::generate_coupon_body("user-1"), &mint_token("user-1"))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["coupon"]["code"], "TREKEVERD4E5F6");
    }

    #[tokio::test]
    async fn test_scenario_e_exhausted_attempts_leave_no_coupon() {
        let app = TestApp::with_suffixes(SequenceSuffixes::constant("A1B2C3"));
        app.store.seed_coupon(fixtures::coupon("TREKEVERA1B2C3", 10)).await;

        let (status, body) = app
            .post_as("/api/coupon/generate", &fixtures::generate_coupon_body("user-1"), &mint_token("user-1"))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to generate unique coupon code");
        assert_eq!(app.store.coupons().await.len(), 1);
        assert!(app.store.usage_logs().await.is_empty());
    }
}

mod admin {
    use super::*;

    #[tokio::test]
    async fn test_admin_manages_coupons() {
        let app = TestApp::new();
        let token = mint_token(ADMIN_USER_ID);

        let create = json!({ "code": "monsoon25", "discountPercentage": 25, "maxUses": 50, "trekIds": [TREK_ID] });
        let (status, body) = app.post_as("/api/admin/coupons", &create, &token).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["coupon"]["code"], "MONSOON25");
        assert_eq!(body["coupon"]["max_uses"], 50);
        let coupon_id = body["coupon"]["id"].as_str().unwrap().to_string();

        let (status, body) = app.post_as("/api/admin/coupons", &create, &token).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Coupon code already exists");

        let (status, body) = app.get_as("/api/admin/coupons", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coupons"].as_array().unwrap().len(), 1);

        let toggle_path = format!("/api/admin/coupons/{}/toggle", coupon_id);
        let (status, body) = app.post_as(&toggle_path, &json!({}), &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coupon"]["is_active"], false);

        // Deactivated coupons no longer validate
        let (_, body) = app
            .post("/api/coupon/validate", &json!({ "couponCode": "MONSOON25", "amount": 5000, "trekId": TREK_ID }))
            .await;
        assert_eq!(body["error"], "Invalid or inactive coupon code");
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin_identity() {
        let app = TestApp::new();

        let (status, _) = app.get_as("/api/admin/coupons", "not-a-jwt").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app.get_as("/api/admin/coupons", &mint_token("user-1")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Admin access required");
    }

    #[tokio::test]
    async fn test_toggle_unknown_coupon_is_404() {
        let app = TestApp::new();
        let (status, body) = app
            .post_as("/api/admin/coupons/missing/toggle", &json!({}), &mint_token(ADMIN_USER_ID))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Coupon not found");
    }
}
