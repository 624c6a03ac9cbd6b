//! Payment-status polling and confirmation-email dispatch.
//!
//! After a redirect-based payment the confirmation page lands with
//! `?payment_intent=<id>&redirect_status=...` and polls this endpoint. The
//! intent is the only durable record of the order, so the receipt is rebuilt
//! entirely from its metadata. The poll also triggers the confirmation
//! email, exactly once: the in-process ledger claim is taken before the
//! send, and the `emailSent` metadata flag is written back afterwards so a
//! restarted process still sees it.

use std::collections::HashMap;

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::email::{OrderEmail, OrderItem};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query};
use crate::orders;
use crate::payments::{PaymentIntent, ShippingDetails};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IntentQuery {
    #[serde(default)]
    pub payment_intent: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentLookupResponse {
    pub payment_intent: IntentSnapshot,
}

/// The normalized intent view handed to the confirmation page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentSnapshot {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub shipping: Option<ShippingDetails>,
    pub metadata: HashMap<String, String>,
}

impl From<PaymentIntent> for IntentSnapshot {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            id: intent.id,
            amount: intent.amount,
            currency: intent.currency,
            status: intent.status,
            shipping: intent.shipping,
            metadata: intent.metadata,
        }
    }
}

/// GET /api/payment-intent?payment_intent=<id>
pub async fn get_payment_intent(
    State(state): State<AppState>,
    Query(query): Query<IntentQuery>,
) -> Result<Json<IntentLookupResponse>> {
    let intent_id = query
        .payment_intent
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Payment intent ID is required".into()))?;

    let stripe = state
        .stripe
        .as_ref()
        .ok_or_else(|| AppError::Internal("payment processor not configured".into()))?;

    let intent = stripe.retrieve_intent(&intent_id).await.map_err(|e| {
        tracing::error!(intent_id = %intent_id, error = %e, "failed to retrieve payment intent");
        AppError::Internal("Failed to retrieve payment intent".into())
    })?;

    tracing::debug!(
        intent_id = %intent.id,
        status = %intent.status,
        amount = intent.amount,
        "payment intent retrieved"
    );

    let payer_email = intent
        .metadata
        .get("payerEmail")
        .filter(|e| !e.is_empty())
        .cloned();
    let already_sent = intent
        .metadata
        .get("emailSent")
        .map(|v| v == "true")
        .unwrap_or(false);

    match (intent.status.as_str(), payer_email, already_sent) {
        ("succeeded", Some(email), false) => {
            let order = order_from_intent(&intent, email);
            dispatch_confirmation_email(&state, &intent.id, order);
        }
        (status, email, already) => {
            tracing::debug!(
                status = %status,
                has_email = email.is_some(),
                already_sent = already,
                "not sending confirmation email"
            );
        }
    }

    Ok(Json(IntentLookupResponse {
        payment_intent: intent.into(),
    }))
}

/// Rebuild the receipt from the intent's metadata snapshot.
fn order_from_intent(intent: &PaymentIntent, email: String) -> OrderEmail {
    let meta = &intent.metadata;
    let get = |key: &str| meta.get(key).filter(|v| !v.is_empty());

    let order_number = get("orderNumber")
        .cloned()
        .unwrap_or_else(orders::order_number);
    let quantity: u32 = get("quantity")
        .and_then(|q| q.parse().ok())
        .unwrap_or(1)
        .max(1);
    let shipping_amount: i64 = get("shippingAmount")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let product_amount: i64 = get("productAmount")
        .and_then(|v| v.parse().ok())
        .unwrap_or(intent.amount - shipping_amount);
    let product_name = get("productName").cloned().unwrap_or_else(|| {
        match get("productId") {
            Some(id) => format!("Product {}", id),
            None => "Item".to_string(),
        }
    });

    OrderEmail {
        email,
        order_number,
        order_date: orders::order_date(),
        items: vec![OrderItem {
            name: product_name,
            quantity,
            price: product_amount / quantity as i64,
        }],
        total: intent.amount,
        currency: intent.currency.to_uppercase(),
        shipping_address: intent.shipping.clone(),
        locale: Some("en-US".to_string()),
    }
}

/// Dispatch the confirmation email for a succeeded intent, at most once.
///
/// The ledger claim is taken before spawning so two concurrent polls cannot
/// both send. The send itself runs detached - the payer's response is never
/// held up by mailer latency. On success the `emailSent` flag is written
/// back onto the intent; on failure the claim is released so a later poll
/// can try again.
pub(crate) fn dispatch_confirmation_email(state: &AppState, intent_id: &str, order: OrderEmail) {
    if !state.email_ledger.try_claim(intent_id) {
        tracing::debug!(intent_id = %intent_id, "confirmation email already dispatched");
        return;
    }

    let email = state.email.clone();
    let ledger = state.email_ledger.clone();
    let stripe = state.stripe.clone();
    let intent_id = intent_id.to_string();

    tokio::spawn(async move {
        match email.send_order_confirmation(&order).await {
            Ok(email_id) => {
                tracing::info!(
                    intent_id = %intent_id,
                    email_id = %email_id,
                    "confirmation email dispatched"
                );
                if let Some(stripe) = stripe {
                    if let Err(e) = stripe.mark_email_sent(&intent_id).await {
                        tracing::warn!(
                            intent_id = %intent_id,
                            error = %e,
                            "failed to flag emailSent on intent metadata"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::error!(
                    intent_id = %intent_id,
                    error = %e,
                    "confirmation email failed"
                );
                ledger.release(&intent_id);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent_with_metadata(pairs: &[(&str, &str)]) -> PaymentIntent {
        let metadata: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        serde_json::from_value(serde_json::json!({
            "id": "pi_test",
            "amount": 2500,
            "currency": "cad",
            "status": "succeeded",
            "metadata": metadata,
        }))
        .unwrap()
    }

    #[test]
    fn receipt_rebuilds_from_metadata() {
        let intent = intent_with_metadata(&[
            ("orderNumber", "ORD-42"),
            ("productName", "Sourdough Starter"),
            ("quantity", "2"),
            ("productAmount", "2000"),
            ("shippingAmount", "500"),
        ]);

        let order = order_from_intent(&intent, "buyer@example.com".into());
        assert_eq!(order.order_number, "ORD-42");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Sourdough Starter");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].price, 1000, "unit price is per-item");
        assert_eq!(order.total, 2500, "total includes shipping");
        assert_eq!(order.currency, "CAD");
    }

    #[test]
    fn receipt_defaults_for_sparse_metadata() {
        let intent = intent_with_metadata(&[("productId", "p_1001")]);

        let order = order_from_intent(&intent, "buyer@example.com".into());
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(order.items[0].name, "Product p_1001");
        assert_eq!(order.items[0].quantity, 1);
        // No productAmount recorded: fall back to total minus shipping
        assert_eq!(order.items[0].price, 2500);
    }
}
