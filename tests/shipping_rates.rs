//! Tests for the shipping-rate endpoints with the carrier unconfigured:
//! destination validation and the static-fallback invariant (a valid
//! destination never resolves to an empty rate list).

use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn missing_destination_fields_are_rejected() {
    let app = test_app(create_test_app_state());

    let (status, body) = post_json(&app, "/api/shipping-rates", &json!({"destination": {}})).await;
    assert_eq!(status, 400);
    assert_eq!(
        body["details"],
        "Destination postal code and country are required"
    );

    let (status, _) = post_json(
        &app,
        "/api/shipping-rates",
        &json!({"destination": {"postalCode": "H2X1Y7"}}),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn invalid_canadian_postal_code_is_rejected() {
    let app = test_app(create_test_app_state());

    for bad in ["12345", "H2X1Y", "1A1A1A"] {
        let (status, body) = post_json(
            &app,
            "/api/shipping-rates",
            &json!({"destination": {"postalCode": bad, "country": "CA"}}),
        )
        .await;
        assert_eq!(status, 400, "postal code {:?} should be rejected", bad);
        assert!(
            body["details"].as_str().unwrap().contains("Canadian"),
            "got: {}",
            body["details"]
        );
    }
}

#[tokio::test]
async fn canadian_destination_gets_three_tier_fallback() {
    let app = test_app(create_test_app_state());

    let (status, body) = post_json(
        &app,
        "/api/shipping-rates",
        &json!({"destination": {"postalCode": "H2X1Y7", "country": "CA"}}),
    )
    .await;

    assert_eq!(status, 200);
    let rates = body["rates"].as_array().unwrap();
    let codes: Vec<&str> = rates
        .iter()
        .map(|r| r["serviceCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["DOM.EP", "DOM.RP", "DOM.XP"]);
    assert_eq!(rates[0]["price"], 1500);
    assert_eq!(rates[1]["price"], 1200);
    assert_eq!(rates[2]["price"], 2000);
}

#[tokio::test]
async fn three_character_postal_code_is_accepted() {
    let app = test_app(create_test_app_state());

    // Wallet sheets only share the forward sortation area
    let (status, body) = post_json(
        &app,
        "/api/shipping-rates",
        &json!({"destination": {"postalCode": "h2x", "country": "CA"}}),
    )
    .await;

    assert_eq!(status, 200);
    assert!(!body["rates"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn us_zip_codes_validate_and_fall_back() {
    let app = test_app(create_test_app_state());

    for good in ["90210", "902101234", "90210 "] {
        let (status, body) = post_json(
            &app,
            "/api/shipping-rates",
            &json!({"destination": {"postalCode": good, "country": "US"}}),
        )
        .await;
        assert_eq!(status, 200, "zip {:?} should be accepted", good);
        let codes: Vec<&str> = body["rates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["serviceCode"].as_str().unwrap())
            .collect();
        assert_eq!(codes, ["USA.EP", "USA.XP"]);
    }

    let (status, body) = post_json(
        &app,
        "/api/shipping-rates",
        &json!({"destination": {"postalCode": "9021", "country": "US"}}),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["details"].as_str().unwrap().contains("ZIP"));
}

#[tokio::test]
async fn international_destination_gets_international_rates() {
    let app = test_app(create_test_app_state());

    let (status, body) = post_json(
        &app,
        "/api/shipping-rates",
        &json!({"destination": {"postalCode": "75001", "country": "FR"}}),
    )
    .await;

    assert_eq!(status, 200);
    let codes: Vec<&str> = body["rates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["serviceCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["INT.SP", "INT.XP"]);
}

#[tokio::test]
async fn wallet_flag_collapses_rates_to_two_options() {
    let app = test_app(create_test_app_state());

    let (status, body) = post_json(
        &app,
        "/api/shipping-rates",
        &json!({
            "destination": {"postalCode": "H2X1Y7", "country": "CA"},
            "wallet": true,
        }),
    )
    .await;

    assert_eq!(status, 200);
    let options = body["shippingOptions"].as_array().unwrap();
    assert_eq!(options.len(), 2);

    // Cheapest rate becomes free and pre-selected
    assert_eq!(options[0]["id"], "DOM.RP");
    assert_eq!(options[0]["amount"], 0);
    assert_eq!(options[0]["selected"], true);

    // Expedited option carries the fixed discount (2000 - 500)
    assert_eq!(options[1]["id"], "DOM.XP");
    assert_eq!(options[1]["amount"], 1500);
    assert_eq!(options[1]["selected"], false);
}

#[tokio::test]
async fn lettermail_rates_follow_weight_brackets() {
    let app = test_app(create_test_app_state());

    let cases = [(25.0, 192), (40.0, 254), (80.0, 331), (200.0, 505)];
    for (weight, price) in cases {
        let (status, body) = post_json(
            &app,
            "/api/lettermail-rates",
            &json!({
                "destination": {"postalCode": "H2X1Y7", "country": "CA"},
                "weight": weight,
            }),
        )
        .await;
        assert_eq!(status, 200);
        let rates = body["rates"].as_array().unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0]["serviceCode"], "DOM.LM");
        assert_eq!(rates[0]["price"], price, "weight {}g", weight);
    }
}

#[tokio::test]
async fn lettermail_requires_positive_weight() {
    let app = test_app(create_test_app_state());

    let (status, body) = post_json(
        &app,
        "/api/lettermail-rates",
        &json!({
            "destination": {"postalCode": "H2X1Y7", "country": "CA"},
            "weight": 0,
        }),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["details"].as_str().unwrap().contains("Weight"));

    // Missing weight is a deserialization failure, still a 400
    let (status, _) = post_json(
        &app,
        "/api/lettermail-rates",
        &json!({"destination": {"postalCode": "H2X1Y7", "country": "CA"}}),
    )
    .await;
    assert_eq!(status, 400);
}
