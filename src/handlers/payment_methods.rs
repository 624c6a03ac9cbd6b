//! Payment-methods probe.
//!
//! The checkout UI asks which payment methods to advertise. The answer
//! never fails: an unconfigured or unreachable processor degrades to the
//! default list with `verified: false`.

use axum::extract::State;
use serde::Serialize;

use crate::extractors::Json;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PaymentMethod {
    #[serde(rename = "type")]
    pub method_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brands: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub country: Option<String>,
    pub default_currency: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsResponse {
    pub payment_methods: Vec<PaymentMethod>,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountInfo>,
    pub message: &'static str,
}

fn default_methods() -> Vec<PaymentMethod> {
    vec![
        PaymentMethod {
            method_type: "card",
            brands: Some(vec!["visa", "mastercard", "amex"]),
        },
        PaymentMethod {
            method_type: "google_pay",
            brands: None,
        },
        PaymentMethod {
            method_type: "klarna",
            brands: None,
        },
        PaymentMethod {
            method_type: "link",
            brands: None,
        },
    ]
}

fn verified_methods() -> Vec<PaymentMethod> {
    let mut methods = default_methods();
    methods.insert(
        2,
        PaymentMethod {
            method_type: "apple_pay",
            brands: None,
        },
    );
    methods
}

/// GET /api/payment-methods
pub async fn list(State(state): State<AppState>) -> Json<PaymentMethodsResponse> {
    let Some(ref stripe) = state.stripe else {
        return Json(PaymentMethodsResponse {
            payment_methods: default_methods(),
            verified: false,
            account: None,
            message: "Using default payment methods (Stripe not configured)",
        });
    };

    match stripe.retrieve_account().await {
        Ok(account) => Json(PaymentMethodsResponse {
            payment_methods: verified_methods(),
            verified: true,
            account: Some(AccountInfo {
                country: account.country,
                default_currency: account.default_currency,
            }),
            message: "Payment methods verified via Stripe API",
        }),
        Err(e) => {
            tracing::error!(error = %e, "failed to verify payment methods");
            Json(PaymentMethodsResponse {
                payment_methods: default_methods(),
                verified: false,
                account: None,
                message: "Failed to verify payment methods, using defaults",
            })
        }
    }
}
