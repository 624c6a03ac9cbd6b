//! Test utilities and fixtures for Heirbloom integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

pub use heirbloom::cart::CartStore;
pub use heirbloom::email::EmailService;
pub use heirbloom::handlers;
pub use heirbloom::orders::EmailLedger;
pub use heirbloom::shipping::ShippingService;
pub use heirbloom::state::AppState;

/// App state with no external services configured: carrier lookups fall back
/// to the static tables and payment/email endpoints fail closed.
pub fn create_test_app_state() -> AppState {
    AppState {
        carts: CartStore::new(),
        shipping: ShippingService::new(None, "H2X1Y7".to_string()),
        stripe: None,
        email: EmailService::new(
            None,
            "Heirbloom Orders <orders@heirbloom.local>".to_string(),
            None,
            None,
        ),
        email_ledger: EmailLedger::new(),
        site_url: "http://localhost:3000".to_string(),
    }
}

/// The API router without rate limiting (oneshot requests carry no peer
/// address for the limiter to key on).
pub fn test_app(state: AppState) -> Router {
    handlers::test_router().with_state(state)
}

/// Fire one request at the router and parse the JSON response.
/// An empty body parses as `Value::Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<&Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response should be valid JSON")
    };

    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, &[], None).await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(app, "POST", uri, &[], Some(body)).await
}
