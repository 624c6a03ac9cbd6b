//! Cart endpoints. The cart id travels in the `x-cart-id` header; POST
//! creates a cart on first use and the response carries the id the client
//! should persist in its cookie.

use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::cart::Cart;
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query};
use crate::state::AppState;

const CART_ID_HEADER: &str = "x-cart-id";

fn cart_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CART_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}

fn require_cart_id(headers: &HeaderMap) -> Result<&str> {
    cart_id(headers).ok_or_else(|| AppError::BadRequest("Cart ID required".into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub variant_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub variant_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemQuery {
    #[serde(default)]
    pub variant_id: Option<String>,
}

/// GET /api/cart - the cart snapshot, or JSON null when the header is
/// missing or the cart is unknown.
pub async fn get_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Option<Cart>> {
    let cart = cart_id(&headers).and_then(|id| state.carts.get(id));
    Json(cart)
}

/// POST /api/cart {variantId, quantity?} - add to the cart, creating it when
/// no id is supplied.
pub async fn add_to_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<Cart>> {
    let cart = state
        .carts
        .add(cart_id(&headers), &request.variant_id, request.quantity)?;
    tracing::debug!(cart_id = %cart.id, variant = %request.variant_id, "added to cart");
    Ok(Json(cart))
}

/// PATCH /api/cart {variantId, quantity} - set a line's quantity.
/// Quantity zero removes the line.
pub async fn update_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<Cart>> {
    let id = require_cart_id(&headers)?;
    let cart = state
        .carts
        .update(id, &request.variant_id, request.quantity)?;
    Ok(Json(cart))
}

/// DELETE /api/cart?variantId=... - remove a line. Without `variantId` the
/// whole cart is emptied (the confirmation page clears it after payment).
pub async fn remove_from_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RemoveItemQuery>,
) -> Result<Json<Cart>> {
    let id = require_cart_id(&headers)?;
    let cart = match query.variant_id {
        Some(ref variant_id) => state.carts.remove(id, variant_id)?,
        None => state.carts.clear(id)?,
    };
    Ok(Json(cart))
}
