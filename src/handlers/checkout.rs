//! Checkout endpoints.
//!
//! Two paths create payment intents:
//! - `create-payment-intent`: the standard Elements flow. The browser gets a
//!   client secret and confirms directly with the processor; this server
//!   only learns the outcome when the confirmation page polls later.
//! - `instant-checkout`: the wallet fast path. The payment sheet already
//!   produced a payment method, so the intent is confirmed server-side and
//!   the handler branches on the resulting status.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::confirmation::dispatch_confirmation_email;
use crate::email::{OrderEmail, OrderItem};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::orders;
use crate::payments::{ElementsIntent, ShippingAddress, ShippingDetails, StripeClient, WalletIntent};
use crate::state::AppState;

fn require_stripe(state: &AppState) -> Result<&StripeClient> {
    state
        .stripe
        .as_ref()
        .ok_or_else(|| AppError::Internal("payment processor not configured".into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    /// Cart total in cents.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub cart_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
    pub order_number: String,
}

/// POST /api/create-payment-intent
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<Json<CreatePaymentIntentResponse>> {
    if request.amount <= 0 {
        return Err(AppError::BadRequest("Invalid amount".into()));
    }
    if request.currency.trim().is_empty() {
        return Err(AppError::BadRequest("Missing currency".into()));
    }
    let stripe = require_stripe(&state)?;

    let order_number = orders::order_number();
    let intent = stripe
        .create_intent(&ElementsIntent {
            amount: request.amount,
            currency: &request.currency,
            cart_id: request.cart_id.as_deref(),
            order_number: &order_number,
        })
        .await?;

    tracing::info!(
        intent_id = %intent.id,
        amount = intent.amount,
        order_number = %order_number,
        "payment intent created"
    );

    let client_secret = intent
        .client_secret
        .ok_or_else(|| AppError::Internal("intent response missing client secret".into()))?;

    Ok(Json(CreatePaymentIntentResponse {
        client_secret,
        order_number,
    }))
}

/// Shipping address as wallet payment sheets report it. Different wallets
/// use different field names for the same thing, hence the fallback pairs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddress {
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address_line: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub administrative_area: Option<String>,
    #[serde(default, alias = "postal_code")]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl WalletAddress {
    fn to_shipping(&self) -> ShippingDetails {
        ShippingDetails {
            name: self.recipient.clone().or_else(|| self.name.clone()),
            phone: self.phone.clone(),
            address: Some(ShippingAddress {
                line1: self.address_line.first().cloned(),
                line2: self.address_line.get(1).cloned(),
                city: self.city.clone().or_else(|| self.locality.clone()),
                state: self
                    .region
                    .clone()
                    .or_else(|| self.administrative_area.clone()),
                postal_code: self.postal_code.clone(),
                country: self.country.clone(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantCheckoutRequest {
    pub payment_method_id: String,
    /// Product subtotal in cents.
    pub amount: i64,
    /// Selected shipping rate in cents.
    #[serde(default)]
    pub shipping_amount: Option<i64>,
    pub currency: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub shipping_address: Option<WalletAddress>,
    #[serde(default)]
    pub shipping_option_id: Option<String>,
    #[serde(default)]
    pub payer_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InstantCheckoutResponse {
    #[serde(rename_all = "camelCase")]
    RequiresAction {
        requires_action: bool,
        client_secret: String,
        payment_intent_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Completed {
        status: String,
        payment_intent_id: String,
    },
}

/// POST /api/instant-checkout
pub async fn instant_checkout(
    State(state): State<AppState>,
    Json(request): Json<InstantCheckoutRequest>,
) -> Result<Json<InstantCheckoutResponse>> {
    if request.payment_method_id.trim().is_empty() {
        return Err(AppError::BadRequest("Missing paymentMethodId".into()));
    }
    if request.amount <= 0 {
        return Err(AppError::BadRequest("Invalid amount".into()));
    }
    if request.currency.trim().is_empty() {
        return Err(AppError::BadRequest("Missing currency".into()));
    }
    let shipping_amount = request.shipping_amount.unwrap_or(0);
    if shipping_amount < 0 {
        return Err(AppError::BadRequest("Invalid shipping amount".into()));
    }
    if shipping_amount == 0 {
        // The payment sheet is expected to re-post with the selected rate;
        // a zero here usually means the client skipped the shipping step.
        tracing::warn!("instant checkout without shipping amount");
    }
    let stripe = require_stripe(&state)?;

    let order_number = orders::order_number();
    let quantity = request.quantity.unwrap_or(1).max(1);
    let return_url = format!("{}/confirmation", state.site_url);
    let shipping = request.shipping_address.as_ref().map(WalletAddress::to_shipping);

    let intent = stripe
        .create_confirmed_intent(&WalletIntent {
            payment_method_id: &request.payment_method_id,
            product_amount: request.amount,
            shipping_amount,
            currency: &request.currency,
            return_url: &return_url,
            order_number: &order_number,
            product_id: request.product_id.as_deref(),
            product_name: request.product_name.as_deref(),
            quantity,
            shipping_option_id: request.shipping_option_id.as_deref(),
            payer_email: request.payer_email.as_deref(),
            shipping: shipping.as_ref(),
        })
        .await?;

    tracing::info!(
        intent_id = %intent.id,
        amount = intent.amount,
        status = %intent.status,
        order_number = %order_number,
        "wallet payment intent confirmed"
    );

    if intent.status == "requires_action"
        && intent
            .next_action
            .as_ref()
            .is_some_and(|a| a.action_type == "use_stripe_sdk")
    {
        let client_secret = intent
            .client_secret
            .ok_or_else(|| AppError::Internal("intent response missing client secret".into()))?;
        return Ok(Json(InstantCheckoutResponse::RequiresAction {
            requires_action: true,
            client_secret,
            payment_intent_id: intent.id,
        }));
    }

    if intent.status == "succeeded" {
        let payer_email = request.payer_email.clone().unwrap_or_default();
        if payer_email.is_empty() {
            tracing::warn!(
                intent_id = %intent.id,
                "skipping confirmation email: missing payer email"
            );
        } else {
            let product_name = request
                .product_name
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| request.product_id.clone())
                .unwrap_or_else(|| "Item".to_string());
            let order = OrderEmail {
                email: payer_email,
                order_number,
                order_date: orders::order_date(),
                items: vec![OrderItem {
                    name: product_name,
                    quantity,
                    price: request.amount / quantity.max(1) as i64,
                }],
                total: intent.amount,
                currency: request.currency.to_uppercase(),
                // Prefer the processor-normalized address over the raw
                // wallet payload.
                shipping_address: intent.shipping.clone().or(shipping),
                locale: None,
            };
            dispatch_confirmation_email(&state, &intent.id, order);
        }

        return Ok(Json(InstantCheckoutResponse::Completed {
            status: intent.status,
            payment_intent_id: intent.id,
        }));
    }

    Err(AppError::BadRequest(format!(
        "Unexpected payment status: {}",
        intent.status
    )))
}
