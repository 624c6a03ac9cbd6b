pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod confirmation;
pub mod email;
pub mod newsletter;
pub mod payment_methods;
pub mod shipping;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::rate_limit;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Assemble the public API router with per-tier rate limiting.
pub fn router(limits: RateLimitConfig) -> Router<AppState> {
    // Every request in this group reaches the payment processor or mailer.
    let payment = Router::new()
        .route(
            "/api/create-payment-intent",
            post(checkout::create_payment_intent),
        )
        .route("/api/instant-checkout", post(checkout::instant_checkout))
        .route("/api/payment-intent", get(confirmation::get_payment_intent))
        .route(
            "/api/send-confirmation-email",
            post(email::send_confirmation_email),
        )
        .route("/api/newsletter", post(newsletter::subscribe))
        .route_layer(rate_limit::strict_layer(limits.strict_rpm));

    let standard = Router::new()
        .route(
            "/api/cart",
            get(cart::get_cart)
                .post(cart::add_to_cart)
                .patch(cart::update_cart)
                .delete(cart::remove_from_cart),
        )
        .route("/api/shipping-rates", post(shipping::parcel_rates))
        .route("/api/lettermail-rates", post(shipping::lettermail_rates))
        .route("/api/payment-methods", get(payment_methods::list))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/{slug}", get(catalog::get_product))
        .route("/api/categories", get(catalog::list_categories))
        .route_layer(rate_limit::standard_layer(limits.standard_rpm));

    let relaxed = Router::new()
        .route("/health", get(health))
        .route_layer(rate_limit::relaxed_layer(limits.relaxed_rpm));

    Router::new().merge(payment).merge(standard).merge(relaxed)
}

/// The same routes without rate limiting, for integration tests driving the
/// router with `oneshot` (no peer address to key the limiter on).
pub fn test_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/create-payment-intent",
            post(checkout::create_payment_intent),
        )
        .route("/api/instant-checkout", post(checkout::instant_checkout))
        .route("/api/payment-intent", get(confirmation::get_payment_intent))
        .route(
            "/api/send-confirmation-email",
            post(email::send_confirmation_email),
        )
        .route("/api/newsletter", post(newsletter::subscribe))
        .route(
            "/api/cart",
            get(cart::get_cart)
                .post(cart::add_to_cart)
                .patch(cart::update_cart)
                .delete(cart::remove_from_cart),
        )
        .route("/api/shipping-rates", post(shipping::parcel_rates))
        .route("/api/lettermail-rates", post(shipping::lettermail_rates))
        .route("/api/payment-methods", get(payment_methods::list))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/{slug}", get(catalog::get_product))
        .route("/api/categories", get(catalog::list_categories))
        .route("/health", get(health))
}
