use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

const API_BASE: &str = "https://api.stripe.com/v1";

/// How long to wait on the account probe before reporting defaults.
const ACCOUNT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Payment intent snapshot - only the fields this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Total authorized amount in cents (product + shipping).
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub next_action: Option<NextAction>,
    #[serde(default)]
    pub shipping: Option<ShippingDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextAction {
    #[serde(rename = "type")]
    pub action_type: String,
}

/// Stripe's shipping sub-object. Also the shape the confirmation email
/// endpoint accepts, so it serializes both ways.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<ShippingAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub default_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Parameters for the standard Elements checkout path: the browser confirms
/// later with the client secret, so only amount and bookkeeping metadata go
/// on the intent.
#[derive(Debug)]
pub struct ElementsIntent<'a> {
    /// Cart total in cents.
    pub amount: i64,
    pub currency: &'a str,
    pub cart_id: Option<&'a str>,
    pub order_number: &'a str,
}

impl ElementsIntent<'_> {
    fn form(&self) -> Vec<(String, String)> {
        vec![
            ("amount".into(), self.amount.to_string()),
            ("currency".into(), self.currency.to_lowercase()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
            (
                "metadata[cartId]".into(),
                self.cart_id.unwrap_or_default().to_string(),
            ),
            ("metadata[orderNumber]".into(), self.order_number.to_string()),
        ]
    }
}

/// Parameters for the instant/wallet path: the wallet already supplied a
/// payment method, so the intent is confirmed server-side in one call.
///
/// The metadata snapshot is deliberately denormalized - the intent is the
/// only durable record of the order, and the confirmation page rebuilds the
/// receipt from it.
#[derive(Debug)]
pub struct WalletIntent<'a> {
    pub payment_method_id: &'a str,
    /// Product subtotal in cents.
    pub product_amount: i64,
    /// Selected shipping rate in cents.
    pub shipping_amount: i64,
    pub currency: &'a str,
    pub return_url: &'a str,
    pub order_number: &'a str,
    pub product_id: Option<&'a str>,
    pub product_name: Option<&'a str>,
    pub quantity: u32,
    pub shipping_option_id: Option<&'a str>,
    pub payer_email: Option<&'a str>,
    pub shipping: Option<&'a ShippingDetails>,
}

impl WalletIntent<'_> {
    /// Total authorized amount: product + shipping, exactly.
    pub fn total(&self) -> i64 {
        self.product_amount + self.shipping_amount
    }

    fn form(&self) -> Vec<(String, String)> {
        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), self.total().to_string()),
            ("currency".into(), self.currency.to_lowercase()),
            ("payment_method".into(), self.payment_method_id.into()),
            ("confirmation_method".into(), "automatic".into()),
            ("confirm".into(), "true".into()),
            ("return_url".into(), self.return_url.into()),
            (
                "metadata[productId]".into(),
                self.product_id.unwrap_or_default().into(),
            ),
            (
                "metadata[productName]".into(),
                self.product_name.unwrap_or_default().into(),
            ),
            ("metadata[quantity]".into(), self.quantity.to_string()),
            ("metadata[orderNumber]".into(), self.order_number.into()),
            (
                "metadata[shippingOptionId]".into(),
                self.shipping_option_id.unwrap_or_default().into(),
            ),
            (
                "metadata[shippingAmount]".into(),
                self.shipping_amount.to_string(),
            ),
            (
                "metadata[productAmount]".into(),
                self.product_amount.to_string(),
            ),
            (
                "metadata[payerEmail]".into(),
                self.payer_email.unwrap_or_default().into(),
            ),
        ];

        if let Some(shipping) = self.shipping {
            if let Some(ref name) = shipping.name {
                form.push(("shipping[name]".into(), name.clone()));
            }
            if let Some(ref phone) = shipping.phone {
                form.push(("shipping[phone]".into(), phone.clone()));
            }
            if let Some(ref addr) = shipping.address {
                let fields = [
                    ("line1", &addr.line1),
                    ("line2", &addr.line2),
                    ("city", &addr.city),
                    ("state", &addr.state),
                    ("postal_code", &addr.postal_code),
                    ("country", &addr.country),
                ];
                for (key, value) in fields {
                    if let Some(value) = value {
                        form.push((format!("shipping[address][{}]", key), value.clone()));
                    }
                }
            }
        }

        form
    }
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.to_string(),
        }
    }

    /// Create an intent for the Elements path and hand the client secret back
    /// to the browser. The idempotency key ties retried submissions of the
    /// same order to one authorization.
    pub async fn create_intent(&self, params: &ElementsIntent<'_>) -> Result<PaymentIntent> {
        self.send_intent(
            self.client
                .post(format!("{}/payment_intents", API_BASE))
                .basic_auth(&self.secret_key, None::<&str>)
                .header("Idempotency-Key", format!("create-{}", params.order_number))
                .form(&params.form()),
        )
        .await
    }

    /// Create and immediately confirm an intent with a wallet-supplied
    /// payment method.
    pub async fn create_confirmed_intent(
        &self,
        params: &WalletIntent<'_>,
    ) -> Result<PaymentIntent> {
        self.send_intent(
            self.client
                .post(format!("{}/payment_intents", API_BASE))
                .basic_auth(&self.secret_key, None::<&str>)
                .header("Idempotency-Key", format!("confirm-{}", params.order_number))
                .form(&params.form()),
        )
        .await
    }

    pub async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        self.send_intent(
            self.client
                .get(format!("{}/payment_intents/{}", API_BASE, intent_id))
                .basic_auth(&self.secret_key, None::<&str>),
        )
        .await
    }

    /// Write the duplicate-suppression flag back onto the intent metadata.
    /// Stripe merges metadata keys, so the order snapshot is preserved.
    pub async fn mark_email_sent(&self, intent_id: &str) -> Result<()> {
        self.send_intent(
            self.client
                .post(format!("{}/payment_intents/{}", API_BASE, intent_id))
                .basic_auth(&self.secret_key, None::<&str>)
                .form(&[("metadata[emailSent]", "true")]),
        )
        .await?;
        Ok(())
    }

    /// Account probe used by the payment-methods endpoint. Bounded so a slow
    /// processor cannot hang the storefront.
    pub async fn retrieve_account(&self) -> Result<Account> {
        let response = self
            .client
            .get(format!("{}/account", API_BASE))
            .basic_auth(&self.secret_key, None::<&str>)
            .timeout(ACCOUNT_PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("account request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Payment(error_message(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Payment(format!("failed to parse account response: {}", e)))
    }

    async fn send_intent(&self, request: reqwest::RequestBuilder) -> Result<PaymentIntent> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Payment(error_message(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Payment(format!("failed to parse intent response: {}", e)))
    }
}

/// Pull the human-readable message out of a Stripe error body.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<StripeErrorResponse>(&body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| format!("{}: {}", status, body))
}
