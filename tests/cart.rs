//! Tests for the cart endpoints: totals after every mutation, cart creation
//! on first add, and the error responses for missing ids and unknown items.

use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn get_without_cart_id_returns_null() {
    let app = test_app(create_test_app_state());

    let (status, body) = get(&app, "/api/cart").await;
    assert_eq!(status, 200);
    assert!(body.is_null());
}

#[tokio::test]
async fn get_with_unknown_cart_id_returns_null() {
    let app = test_app(create_test_app_state());

    let (status, body) = send(&app, "GET", "/api/cart", &[("x-cart-id", "cart_missing")], None).await;
    assert_eq!(status, 200);
    assert!(body.is_null());
}

#[tokio::test]
async fn add_creates_cart_and_computes_total() {
    let app = test_app(create_test_app_state());

    // p_1001 is discounted to 1499 cents a unit
    let (status, body) = post_json(
        &app,
        "/api/cart",
        &json!({"variantId": "p_1001", "quantity": 2}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["price"], 1499);
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["subtotal"], 2998);
    assert_eq!(body["total"], 2998);

    let cart_id = body["id"].as_str().unwrap().to_string();
    assert!(cart_id.starts_with("cart_"));

    // The snapshot is retrievable under the returned id
    let (status, body) = send(&app, "GET", "/api/cart", &[("x-cart-id", &cart_id)], None).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 2998);
}

#[tokio::test]
async fn add_same_product_merges_lines() {
    let app = test_app(create_test_app_state());

    let (_, body) = post_json(&app, "/api/cart", &json!({"variantId": "p_1001"})).await;
    let cart_id = body["id"].as_str().unwrap().to_string();

    // Adding by slug merges into the same line
    let (status, body) = send(
        &app,
        "POST",
        "/api/cart",
        &[("x-cart-id", &cart_id)],
        Some(&json!({"variantId": "sourdough-starter", "quantity": 2})),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 3);
    assert_eq!(body["total"], 3 * 1499);
}

#[tokio::test]
async fn update_quantity_to_zero_removes_item() {
    let app = test_app(create_test_app_state());

    let (_, body) = post_json(
        &app,
        "/api/cart",
        &json!({"variantId": "p_1001", "quantity": 2}),
    )
    .await;
    let cart_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["total"], 2998);

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/cart",
        &[("x-cart-id", &cart_id)],
        Some(&json!({"variantId": "p_1001", "quantity": 0})),
    )
    .await;

    assert_eq!(status, 200);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn totals_follow_update_remove_clear() {
    let app = test_app(create_test_app_state());

    let (_, body) = post_json(&app, "/api/cart", &json!({"variantId": "p_1001"})).await;
    let cart_id = body["id"].as_str().unwrap().to_string();
    let headers: &[(&str, &str)] = &[("x-cart-id", &cart_id)];

    let (_, body) = send(
        &app,
        "POST",
        "/api/cart",
        headers,
        Some(&json!({"variantId": "p_1002", "quantity": 2})),
    )
    .await;
    assert_eq!(body["total"], 1499 + 2 * 1999);

    let (_, body) = send(
        &app,
        "PATCH",
        "/api/cart",
        headers,
        Some(&json!({"variantId": "p_1002", "quantity": 1})),
    )
    .await;
    assert_eq!(body["total"], 1499 + 1999);

    let (status, body) = send(&app, "DELETE", "/api/cart?variantId=p_1001", headers, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1999);

    // DELETE without a variant empties the cart (post-payment clear)
    let (status, body) = send(&app, "DELETE", "/api/cart", headers, None).await;
    assert_eq!(status, 200);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn update_without_cart_id_is_rejected() {
    let app = test_app(create_test_app_state());

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/cart",
        &[],
        Some(&json!({"variantId": "p_1001", "quantity": 1})),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["details"], "Cart ID required");
}

#[tokio::test]
async fn add_unknown_product_is_not_found() {
    let app = test_app(create_test_app_state());

    let (status, _) = post_json(&app, "/api/cart", &json!({"variantId": "p_9999"})).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn update_unknown_item_is_not_found() {
    let app = test_app(create_test_app_state());

    let (_, body) = post_json(&app, "/api/cart", &json!({"variantId": "p_1001"})).await;
    let cart_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/cart",
        &[("x-cart-id", &cart_id)],
        Some(&json!({"variantId": "p_1004", "quantity": 1})),
    )
    .await;
    assert_eq!(status, 404);
}
