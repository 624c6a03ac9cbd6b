//! Tests for the payment-intent lookup, confirmation-email, and newsletter
//! endpoints - the paths that reject before any external call.

use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn payment_intent_lookup_requires_id() {
    let app = test_app(create_test_app_state());

    let (status, body) = get(&app, "/api/payment-intent").await;
    assert_eq!(status, 400);
    assert_eq!(body["details"], "Payment intent ID is required");

    let (status, _) = get(&app, "/api/payment-intent?payment_intent=").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn payment_intent_lookup_fails_closed_without_processor() {
    let app = test_app(create_test_app_state());

    let (status, _) = get(&app, "/api/payment-intent?payment_intent=pi_123").await;
    assert_eq!(status, 500);
}

#[tokio::test]
async fn confirmation_email_rejects_invalid_address() {
    let app = test_app(create_test_app_state());

    for bad in ["", "   ", "not-an-email"] {
        let (status, body) = post_json(
            &app,
            "/api/send-confirmation-email",
            &json!({
                "email": bad,
                "orderNumber": "ORD-1",
                "orderDate": "Aug 06, 2025",
                "items": [{"name": "Sourdough Starter", "quantity": 1, "price": 1499}],
                "total": 2699,
                "currency": "CAD",
            }),
        )
        .await;
        assert_eq!(status, 400, "email {:?} should be rejected", bad);
        assert_eq!(body["details"], "Invalid email address");
    }
}

#[tokio::test]
async fn confirmation_email_rejects_empty_order() {
    let app = test_app(create_test_app_state());

    let (status, body) = post_json(
        &app,
        "/api/send-confirmation-email",
        &json!({
            "email": "buyer@example.com",
            "orderNumber": "ORD-1",
            "orderDate": "Aug 06, 2025",
            "items": [],
            "total": 0,
            "currency": "CAD",
        }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["details"], "Order has no items");
}

#[tokio::test]
async fn confirmation_email_fails_closed_without_mailer() {
    let app = test_app(create_test_app_state());

    let (status, body) = post_json(
        &app,
        "/api/send-confirmation-email",
        &json!({
            "email": "buyer@example.com",
            "orderNumber": "ORD-1",
            "orderDate": "Aug 06, 2025",
            "items": [{"name": "Sourdough Starter", "quantity": 2, "price": 1499}],
            "total": 4198,
            "currency": "CAD",
            "shippingAddress": {
                "name": "Ada Lovelace",
                "address": {
                    "line1": "123 Rue St-Denis",
                    "city": "Montreal",
                    "state": "QC",
                    "postal_code": "H2X 1Y7",
                    "country": "CA",
                },
            },
        }),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to send email");
}

#[tokio::test]
async fn newsletter_rejects_invalid_email() {
    let app = test_app(create_test_app_state());

    for bad in ["", "no-at-sign"] {
        let (status, _) = post_json(&app, "/api/newsletter", &json!({"email": bad})).await;
        assert_eq!(status, 400, "email {:?} should be rejected", bad);
    }
}

#[tokio::test]
async fn newsletter_fails_closed_without_audience() {
    let app = test_app(create_test_app_state());

    let (status, _) = post_json(
        &app,
        "/api/newsletter",
        &json!({"email": "reader@example.com"}),
    )
    .await;
    assert_eq!(status, 500);
}

#[tokio::test]
async fn payment_methods_degrade_without_processor() {
    let app = test_app(create_test_app_state());

    let (status, body) = get(&app, "/api/payment-methods").await;
    assert_eq!(status, 200);
    assert_eq!(body["verified"], false);
    assert!(!body["paymentMethods"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app(create_test_app_state());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}
