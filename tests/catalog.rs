//! Tests for the read-only catalog endpoints.

use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn products_list_and_filter() {
    let app = test_app(create_test_app_state());

    let (status, body) = get(&app, "/api/products").await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (_, body) = get(&app, "/api/products?limit=2").await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = get(&app, "/api/products?category=nonexistent").await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn product_lookup_by_slug_or_id() {
    let app = test_app(create_test_app_state());

    let (status, body) = get(&app, "/api/products/sourdough-starter").await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], "p_1001");
    assert_eq!(body["discountedPrice"], 1499);

    let (status, body) = get(&app, "/api/products/p_1002").await;
    assert_eq!(status, 200);
    assert_eq!(body["slug"], "basic-sourdough-guide");

    let (status, _) = get(&app, "/api/products/never-made").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn categories_are_listed() {
    let app = test_app(create_test_app_state());

    let (status, body) = get(&app, "/api/categories").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!(["products"]));
}
