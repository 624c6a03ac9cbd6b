//! Static rate tables, used when the carrier is unconfigured or unreachable.
//!
//! Values mirror the published Canada Post retail rates closely enough for
//! checkout to keep working through an outage.

use super::ShippingRate;

fn rate(code: &str, name: &str, description: &str, price: i64, window: &str) -> ShippingRate {
    ShippingRate {
        id: code.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        estimated_days: window.to_string(),
        service_code: code.to_string(),
    }
}

/// Parcel rates by destination country.
pub fn mock_parcel_rates(country: &str) -> Vec<ShippingRate> {
    match country {
        "CA" => vec![
            rate(
                "DOM.EP",
                "Expedited Parcel",
                "Canada Post Expedited Parcel",
                1500,
                "3-5 business days",
            ),
            rate(
                "DOM.RP",
                "Regular Parcel",
                "Canada Post Regular Parcel",
                1200,
                "5-7 business days",
            ),
            rate(
                "DOM.XP",
                "Xpresspost",
                "Canada Post Xpresspost",
                2000,
                "1-2 business days",
            ),
        ],
        "US" => vec![
            rate(
                "USA.EP",
                "Expedited Parcel USA",
                "Canada Post Expedited Parcel USA",
                2500,
                "4-7 business days",
            ),
            rate(
                "USA.XP",
                "Xpresspost USA",
                "Canada Post Xpresspost USA",
                3500,
                "2-3 business days",
            ),
        ],
        _ => vec![
            rate(
                "INT.SP",
                "Small Packet International",
                "Canada Post Small Packet International",
                3000,
                "6-10 business days",
            ),
            rate(
                "INT.XP",
                "Xpresspost International",
                "Canada Post Xpresspost International",
                5000,
                "4-6 business days",
            ),
        ],
    }
}

/// Lettermail rates by destination country and weight bracket (grams).
pub fn mock_lettermail_rates(country: &str, weight_grams: f64) -> Vec<ShippingRate> {
    match country {
        "CA" => {
            let (price, bracket) = if weight_grams <= 30.0 {
                (192, "up to 30g")
            } else if weight_grams <= 50.0 {
                (254, "up to 50g")
            } else if weight_grams <= 100.0 {
                (331, "up to 100g")
            } else {
                (505, "up to 500g")
            };
            vec![rate(
                "DOM.LM",
                "Lettermail",
                &format!("Standard Lettermail ({})", bracket),
                price,
                "2-9 business days",
            )]
        }
        "US" => {
            let (price, bracket) = if weight_grams <= 30.0 {
                (154, "up to 30g")
            } else if weight_grams <= 50.0 {
                (224, "up to 50g")
            } else {
                (363, "up to 100g")
            };
            vec![rate(
                "USA.LM",
                "US Lettermail",
                &format!("Lettermail to USA ({})", bracket),
                price,
                "4-7 business days",
            )]
        }
        _ => {
            let (price, bracket) = if weight_grams <= 30.0 {
                (285, "up to 30g")
            } else if weight_grams <= 50.0 {
                (385, "up to 50g")
            } else {
                (570, "up to 100g")
            };
            vec![rate(
                "INT.LM",
                "International Lettermail",
                &format!("Lettermail International ({})", bracket),
                price,
                "6-10 business days",
            )]
        }
    }
}
