//! Shipping-rate endpoints.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extractors::Json;
use crate::shipping::{self, Destination, Package, ShippingRate, WalletShippingOption};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub postal_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelRatesRequest {
    pub destination: Destination,
    #[serde(default)]
    pub origin: Option<Origin>,
    #[serde(default)]
    pub package: Option<Package>,
    /// When set, the rate list is collapsed for a wallet payment sheet.
    #[serde(default)]
    pub wallet: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesResponse {
    pub rates: Vec<ShippingRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_options: Option<Vec<WalletShippingOption>>,
}

/// POST /api/shipping-rates
pub async fn parcel_rates(
    State(state): State<AppState>,
    Json(request): Json<ParcelRatesRequest>,
) -> Result<Json<RatesResponse>> {
    let rates = state
        .shipping
        .parcel_rates(
            &request.destination,
            request.origin.as_ref().map(|o| o.postal_code.as_str()),
            request.package.as_ref(),
        )
        .await?;

    let shipping_options = request.wallet.then(|| shipping::wallet_options(&rates));

    Ok(Json(RatesResponse {
        rates,
        shipping_options,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LettermailRatesRequest {
    pub destination: Destination,
    #[serde(default)]
    pub origin: Option<Origin>,
    /// Weight in grams.
    pub weight: f64,
}

/// POST /api/lettermail-rates
pub async fn lettermail_rates(
    State(state): State<AppState>,
    Json(request): Json<LettermailRatesRequest>,
) -> Result<Json<RatesResponse>> {
    let rates = state
        .shipping
        .lettermail_rates(
            &request.destination,
            request.origin.as_ref().map(|o| o.postal_code.as_str()),
            request.weight,
        )
        .await?;

    Ok(Json(RatesResponse {
        rates,
        shipping_options: None,
    }))
}
