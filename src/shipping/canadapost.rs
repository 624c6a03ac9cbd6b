//! Canada Post rating API client.
//!
//! The rating endpoint speaks XML (`application/vnd.cpc.ship.rate-v4+xml`).
//! The request is a small fixed template and the response is scanned for
//! `price-quote` blocks, so no XML machinery is pulled in for it.

use std::time::Duration;

use reqwest::Client;

use super::{ShippingRate, ValidDestination};
use crate::config::CanadaPostConfig;
use crate::error::{AppError, Result};

/// Abort the carrier call after this long; checkout falls back to the
/// static tables rather than keeping the buyer waiting.
const CARRIER_TIMEOUT: Duration = Duration::from_secs(5);

const RATE_CONTENT_TYPE: &str = "application/vnd.cpc.ship.rate-v4+xml";

#[derive(Clone)]
pub struct CanadaPostClient {
    client: Client,
    config: CanadaPostConfig,
}

impl CanadaPostClient {
    pub fn new(config: CanadaPostConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Rate a parcel. `dimensions` is (length, width, height) in cm.
    pub async fn parcel_rates(
        &self,
        origin: &str,
        destination: &ValidDestination,
        weight_kg: f64,
        dimensions: (f64, f64, f64),
    ) -> Result<Vec<ShippingRate>> {
        let body = build_mailing_scenario(
            &self.config.customer_number,
            origin,
            destination,
            weight_kg,
            Some(dimensions),
        );
        let xml = self.price(body).await?;
        Ok(parse_price_quotes(&xml, "5-7 business days"))
    }

    /// Rate a letter-sized item; weight only, no dimensions.
    pub async fn lettermail_rates(
        &self,
        origin: &str,
        destination: &ValidDestination,
        weight_kg: f64,
    ) -> Result<Vec<ShippingRate>> {
        let body = build_mailing_scenario(
            &self.config.customer_number,
            origin,
            destination,
            weight_kg,
            None,
        );
        let xml = self.price(body).await?;
        Ok(parse_price_quotes(&xml, "3-5 business days"))
    }

    async fn price(&self, body: String) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/rs/ship/price", self.config.api_url))
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .header("Content-Type", RATE_CONTENT_TYPE)
            .header("Accept", RATE_CONTENT_TYPE)
            .header("Accept-language", "en-CA")
            .timeout(CARRIER_TIMEOUT)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Internal("carrier request timed out".into())
                } else {
                    AppError::Internal(format!("carrier request failed: {}", e))
                }
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::warn!(status = %status, body = %text, "carrier returned an error");
            return Err(AppError::Internal(format!(
                "carrier returned status {}",
                status
            )));
        }

        Ok(text)
    }
}

fn build_mailing_scenario(
    customer_number: &str,
    origin: &str,
    destination: &ValidDestination,
    weight_kg: f64,
    dimensions: Option<(f64, f64, f64)>,
) -> String {
    let dimensions_xml = match dimensions {
        Some((length, width, height)) => format!(
            "\n\t\t<dimensions>\n\t\t\t<length>{}</length>\n\t\t\t<width>{}</width>\n\t\t\t<height>{}</height>\n\t\t</dimensions>",
            length, width, height
        ),
        None => String::new(),
    };

    let destination_xml = match destination.country.as_str() {
        "CA" => format!(
            "<domestic>\n\t\t\t<postal-code>{}</postal-code>\n\t\t</domestic>",
            destination.postal_code
        ),
        "US" => format!(
            "<united-states>\n\t\t\t<zip-code>{}</zip-code>\n\t\t</united-states>",
            destination.postal_code
        ),
        country => format!(
            "<international>\n\t\t\t<country-code>{}</country-code>\n\t\t</international>",
            country
        ),
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<mailing-scenario xmlns="http://www.canadapost.ca/ws/ship/rate-v4">
	<customer-number>{}</customer-number>
	<parcel-characteristics>
		<weight>{}</weight>{}
	</parcel-characteristics>
	<origin-postal-code>{}</origin-postal-code>
	<destination>
		{}
	</destination>
</mailing-scenario>"#,
        customer_number, weight_kg, dimensions_xml, origin, destination_xml
    )
}

/// Extract the text of the first `<tag>...</tag>` in `block`.
fn tag_text<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = block.find(&open)? + open.len();
    let end = block[start..].find(&close)? + start;
    Some(&block[start..end])
}

/// Pull rates out of a rating response. Quotes missing a code, name, or
/// price are skipped; an empty result makes the resolver fall back.
fn parse_price_quotes(xml: &str, default_window: &str) -> Vec<ShippingRate> {
    let mut rates = Vec::new();

    for block in xml.split("<price-quote>").skip(1) {
        let quote = match block.find("</price-quote>") {
            Some(end) => &block[..end],
            None => continue,
        };

        let (Some(code), Some(name), Some(due)) = (
            tag_text(quote, "service-code"),
            tag_text(quote, "service-name"),
            tag_text(quote, "due"),
        ) else {
            continue;
        };

        let Ok(dollars) = due.trim().parse::<f64>() else {
            continue;
        };
        let price = (dollars * 100.0).round() as i64;

        let window = tag_text(quote, "expected-delivery-date")
            .map(str::to_string)
            .unwrap_or_else(|| default_window.to_string());

        rates.push(ShippingRate {
            id: code.to_string(),
            name: name.to_string(),
            description: name.to_string(),
            price,
            estimated_days: window,
            service_code: code.to_string(),
        });
    }

    rates
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<price-quotes xmlns="http://www.canadapost.ca/ws/ship/rate-v4">
  <price-quote>
    <service-code>DOM.EP</service-code>
    <service-name>Expedited Parcel</service-name>
    <price-details>
      <due>9.59</due>
    </price-details>
    <service-standard>
      <expected-delivery-date>2025-08-12</expected-delivery-date>
    </service-standard>
  </price-quote>
  <price-quote>
    <service-code>DOM.XP</service-code>
    <service-name>Xpresspost</service-name>
    <price-details>
      <due>13.04</due>
    </price-details>
  </price-quote>
</price-quotes>"#;

    #[test]
    fn parses_quotes_to_cents() {
        let rates = parse_price_quotes(SAMPLE_RESPONSE, "5-7 business days");
        assert_eq!(rates.len(), 2);

        assert_eq!(rates[0].service_code, "DOM.EP");
        assert_eq!(rates[0].price, 959);
        assert_eq!(rates[0].estimated_days, "2025-08-12");

        assert_eq!(rates[1].service_code, "DOM.XP");
        assert_eq!(rates[1].price, 1304);
        assert_eq!(rates[1].estimated_days, "5-7 business days");
    }

    #[test]
    fn malformed_quotes_are_skipped() {
        let xml = "<price-quote><service-code>X</service-code></price-quote>";
        assert!(parse_price_quotes(xml, "n/a").is_empty());
        assert!(parse_price_quotes("", "n/a").is_empty());
    }

    fn dest(postal: &str, country: &str) -> ValidDestination {
        ValidDestination {
            postal_code: postal.to_string(),
            country: country.to_string(),
        }
    }

    #[test]
    fn domestic_scenario_shape() {
        let xml = build_mailing_scenario("0008888888", "H2X1Y7", &dest("K1A0A9", "CA"), 0.05, Some((20.0, 15.0, 10.0)));
        assert!(xml.contains("<customer-number>0008888888</customer-number>"));
        assert!(xml.contains("<origin-postal-code>H2X1Y7</origin-postal-code>"));
        assert!(xml.contains("<postal-code>K1A0A9</postal-code>"));
        assert!(xml.contains("<weight>0.05</weight>"));
        assert!(xml.contains("<length>20</length>"));
    }

    #[test]
    fn us_and_international_scenarios() {
        let us = build_mailing_scenario("c", "H2X1Y7", &dest("90210", "US"), 0.05, None);
        assert!(us.contains("<zip-code>90210</zip-code>"));
        assert!(!us.contains("<dimensions>"));

        let intl = build_mailing_scenario("c", "H2X1Y7", &dest("75001", "FR"), 0.05, None);
        assert!(intl.contains("<country-code>FR</country-code>"));
    }
}
