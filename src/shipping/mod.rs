//! Shipping-rate resolution.
//!
//! Rates come from the Canada Post rating API when credentials are
//! configured, and from the static tables in [`fallback`] otherwise - or
//! whenever the carrier call times out, fails, or returns nothing. A valid
//! destination therefore always resolves to at least one rate.

mod canadapost;
mod fallback;

pub use canadapost::CanadaPostClient;
pub use fallback::{mock_lettermail_rates, mock_parcel_rates};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Default parcel weight when the client sends none (50 g of starter).
const DEFAULT_WEIGHT_KG: f64 = 0.05;
/// Default parcel dimensions in cm.
const DEFAULT_DIMENSIONS: (f64, f64, f64) = (20.0, 15.0, 10.0);
/// Discount applied to the expedited option on the wallet fast path, cents.
const WALLET_EXPEDITED_DISCOUNT: i64 = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Weight in kg.
    pub weight: f64,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRate {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price in cents.
    pub price: i64,
    pub estimated_days: String,
    pub service_code: String,
}

/// A shipping choice on the wallet payment sheet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletShippingOption {
    pub id: String,
    pub label: String,
    /// Amount charged to the payer, in cents.
    pub amount: i64,
    pub detail: String,
    pub selected: bool,
}

/// A destination that passed country-specific postal validation.
/// `postal_code` is cleaned (no whitespace, uppercase) and, for 3-character
/// Canadian codes, padded to the 6-character form the carrier requires.
#[derive(Debug, Clone)]
pub struct ValidDestination {
    pub postal_code: String,
    pub country: String,
}

fn clean_postal_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn is_valid_ca(code: &str) -> bool {
    let chars: Vec<char> = code.chars().collect();
    match chars.len() {
        // Wallet sheets only share the forward sortation area (A1A).
        3 => {
            chars[0].is_ascii_uppercase()
                && chars[1].is_ascii_digit()
                && chars[2].is_ascii_uppercase()
        }
        6 => chars.iter().enumerate().all(|(i, c)| {
            if i % 2 == 0 {
                c.is_ascii_uppercase()
            } else {
                c.is_ascii_digit()
            }
        }),
        _ => false,
    }
}

fn is_valid_us(code: &str) -> bool {
    code.chars().all(|c| c.is_ascii_digit()) && (code.len() == 5 || code.len() == 9)
}

/// Validate a destination, returning the carrier-ready form.
pub fn validate_destination(destination: &Destination) -> Result<ValidDestination> {
    if destination.postal_code.trim().is_empty() || destination.country.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Destination postal code and country are required".into(),
        ));
    }

    let mut postal_code = clean_postal_code(&destination.postal_code);

    match destination.country.as_str() {
        "CA" => {
            if !is_valid_ca(&postal_code) {
                return Err(AppError::BadRequest(
                    "Invalid Canadian postal code format (expected: A1A or A1A1A1)".into(),
                ));
            }
            // Carrier needs 6 characters; A1A0A0 is the partial-code pattern.
            if postal_code.len() == 3 {
                postal_code.push_str("0A0");
            }
        }
        "US" => {
            if !is_valid_us(&postal_code) {
                return Err(AppError::BadRequest("Invalid US ZIP code format".into()));
            }
        }
        // Other countries: any non-empty code, the carrier rates by country.
        _ => {}
    }

    Ok(ValidDestination {
        postal_code,
        country: destination.country.clone(),
    })
}

/// Resolves rates, preferring the carrier and degrading to static tables.
#[derive(Clone)]
pub struct ShippingService {
    carrier: Option<CanadaPostClient>,
    origin_postal_code: String,
}

impl ShippingService {
    pub fn new(carrier: Option<CanadaPostClient>, origin_postal_code: String) -> Self {
        Self {
            carrier,
            origin_postal_code: clean_postal_code(&origin_postal_code),
        }
    }

    fn origin(&self, requested: Option<&str>) -> String {
        match requested {
            Some(o) if !o.trim().is_empty() => clean_postal_code(o),
            _ => self.origin_postal_code.clone(),
        }
    }

    /// Parcel rates for a destination. Never returns an empty list for a
    /// valid destination.
    pub async fn parcel_rates(
        &self,
        destination: &Destination,
        origin: Option<&str>,
        package: Option<&Package>,
    ) -> Result<Vec<ShippingRate>> {
        let dest = validate_destination(destination)?;

        let Some(ref carrier) = self.carrier else {
            tracing::warn!("carrier not configured, returning static rates");
            return Ok(mock_parcel_rates(&dest.country));
        };

        let weight = package.map(|p| p.weight).unwrap_or(DEFAULT_WEIGHT_KG);
        let (dl, dw, dh) = DEFAULT_DIMENSIONS;
        let dimensions = (
            package.and_then(|p| p.length).unwrap_or(dl),
            package.and_then(|p| p.width).unwrap_or(dw),
            package.and_then(|p| p.height).unwrap_or(dh),
        );

        let rates = carrier
            .parcel_rates(&self.origin(origin), &dest, weight, dimensions)
            .await;

        Ok(self.or_fallback(rates, || mock_parcel_rates(&dest.country)))
    }

    /// Lettermail rates for letter-sized items; weight in grams.
    pub async fn lettermail_rates(
        &self,
        destination: &Destination,
        origin: Option<&str>,
        weight_grams: f64,
    ) -> Result<Vec<ShippingRate>> {
        if weight_grams <= 0.0 {
            return Err(AppError::BadRequest(
                "Weight is required and must be greater than 0".into(),
            ));
        }
        let dest = validate_destination(destination)?;

        let Some(ref carrier) = self.carrier else {
            tracing::warn!("carrier not configured, returning static lettermail rates");
            return Ok(mock_lettermail_rates(&dest.country, weight_grams));
        };

        let rates = carrier
            .lettermail_rates(&self.origin(origin), &dest, weight_grams / 1000.0)
            .await;

        Ok(self.or_fallback(rates, || mock_lettermail_rates(&dest.country, weight_grams)))
    }

    fn or_fallback(
        &self,
        rates: Result<Vec<ShippingRate>>,
        fallback: impl FnOnce() -> Vec<ShippingRate>,
    ) -> Vec<ShippingRate> {
        match rates {
            Ok(rates) if !rates.is_empty() => rates,
            Ok(_) => {
                tracing::warn!("carrier returned no rates, falling back to static table");
                fallback()
            }
            Err(e) => {
                tracing::warn!("carrier lookup failed ({}), falling back to static table", e);
                fallback()
            }
        }
    }
}

/// Collapse a rate list to the two options shown on a wallet payment sheet:
/// the cheapest rate re-priced to free (and pre-selected), and the fastest
/// premium rate with a fixed discount.
pub fn wallet_options(rates: &[ShippingRate]) -> Vec<WalletShippingOption> {
    let Some(cheapest) = rates.iter().min_by_key(|r| r.price) else {
        return Vec::new();
    };

    let mut options = vec![WalletShippingOption {
        id: cheapest.id.clone(),
        label: format!("Free Shipping ({})", cheapest.name),
        amount: 0,
        detail: cheapest.estimated_days.clone(),
        selected: true,
    }];

    let expedited = rates
        .iter()
        .filter(|r| r.id != cheapest.id)
        .max_by_key(|r| r.price);
    if let Some(expedited) = expedited {
        options.push(WalletShippingOption {
            id: expedited.id.clone(),
            label: expedited.name.clone(),
            amount: (expedited.price - WALLET_EXPEDITED_DISCOUNT).max(0),
            detail: expedited.estimated_days.clone(),
            selected: false,
        });
    }

    options
}
