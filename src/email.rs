//! Transactional email via the Resend API.
//!
//! Two sends per order: the buyer's confirmation (rendered as text + HTML)
//! and a compact "new order" notification to the store owner. The admin
//! notification must never fail the buyer-facing flow - its errors are
//! logged and swallowed. Newsletter signups go to a Resend audience.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::payments::ShippingDetails;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const RESEND_AUDIENCES_URL: &str = "https://api.resend.com/audiences";

/// One purchased line on the receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Unit price in cents.
    pub price: i64,
}

/// Everything needed to render and address an order confirmation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEmail {
    pub email: String,
    pub order_number: String,
    pub order_date: String,
    pub items: Vec<OrderItem>,
    /// Total paid in cents, shipping included.
    pub total: i64,
    pub currency: String,
    #[serde(default)]
    pub shipping_address: Option<ShippingDetails>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    text: String,
    html: String,
}

#[derive(Debug, Deserialize)]
struct ResendEmailResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct ResendContactRequest<'a> {
    email: &'a str,
    unsubscribed: bool,
}

/// Format cents for email copy, e.g. "$14.99 CAD".
fn format_money(cents: i64, currency: &str) -> String {
    format!("${}.{:02} {}", cents / 100, cents % 100, currency)
}

#[derive(Clone)]
pub struct EmailService {
    api_key: Option<String>,
    from_email: String,
    admin_email: Option<String>,
    audience_id: Option<String>,
    http_client: Client,
}

impl EmailService {
    pub fn new(
        api_key: Option<String>,
        from_email: String,
        admin_email: Option<String>,
        audience_id: Option<String>,
    ) -> Self {
        Self {
            api_key,
            from_email,
            admin_email,
            audience_id,
            http_client: Client::new(),
        }
    }

    /// Send the buyer's order confirmation, then the admin notification.
    /// Returns the Resend id of the buyer email.
    pub async fn send_order_confirmation(&self, order: &OrderEmail) -> Result<String> {
        let Some(ref api_key) = self.api_key else {
            tracing::warn!(
                order_number = %order.order_number,
                "RESEND_API_KEY not set, cannot send confirmation email"
            );
            return Err(AppError::Email("email service not configured".into()));
        };

        let subject = format!("Order Confirmation - {}", order.order_number);
        let request = ResendEmailRequest {
            from: &self.from_email,
            to: vec![order.email.as_str()],
            subject,
            text: render_text(order),
            html: render_html(order),
        };

        let email_id = self.send(api_key, &request).await?;
        tracing::info!(
            to = %order.email,
            order_number = %order.order_number,
            email_id = %email_id,
            "Confirmation email sent"
        );

        // Best effort: the buyer already has their receipt.
        if let Err(e) = self.notify_admin(api_key, order).await {
            tracing::error!(
                order_number = %order.order_number,
                error = %e,
                "Failed to send admin order notification"
            );
        }

        Ok(email_id)
    }

    async fn notify_admin(&self, api_key: &str, order: &OrderEmail) -> Result<()> {
        let Some(ref admin_email) = self.admin_email else {
            return Ok(());
        };

        let request = ResendEmailRequest {
            from: &self.from_email,
            to: vec![admin_email.as_str()],
            subject: format!("New order {}", order.order_number),
            text: render_admin_text(order),
            html: render_admin_html(order),
        };

        self.send(api_key, &request).await?;
        Ok(())
    }

    /// Add a newsletter contact to the configured Resend audience.
    pub async fn subscribe_contact(&self, email: &str) -> Result<()> {
        let Some(ref api_key) = self.api_key else {
            return Err(AppError::Internal("RESEND_API_KEY is not configured".into()));
        };
        let Some(ref audience_id) = self.audience_id else {
            return Err(AppError::Internal(
                "RESEND_AUDIENCE_ID is not configured".into(),
            ));
        };

        let response = self
            .http_client
            .post(format!("{}/{}/contacts", RESEND_AUDIENCES_URL, audience_id))
            .bearer_auth(api_key)
            .json(&ResendContactRequest {
                email,
                unsubscribed: false,
            })
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("newsletter request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Resend contact create failed");
            return Err(AppError::Internal("failed to subscribe contact".into()));
        }

        Ok(())
    }

    async fn send(&self, api_key: &str, request: &ResendEmailRequest<'_>) -> Result<String> {
        let response = self
            .http_client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Email(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Email(format!("{} - {}", status, body)));
        }

        let parsed: ResendEmailResponse = response
            .json()
            .await
            .map_err(|e| AppError::Email(format!("failed to parse response: {}", e)))?;
        Ok(parsed.id)
    }
}

fn shipping_lines(address: &ShippingDetails) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(ref name) = address.name {
        lines.push(name.clone());
    }
    if let Some(ref addr) = address.address {
        if let Some(ref line1) = addr.line1 {
            lines.push(line1.clone());
        }
        if let Some(ref line2) = addr.line2 {
            if !line2.is_empty() {
                lines.push(line2.clone());
            }
        }
        let city_line = [
            addr.city.as_deref().unwrap_or_default(),
            addr.state.as_deref().unwrap_or_default(),
            addr.postal_code.as_deref().unwrap_or_default(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
        if !city_line.is_empty() {
            lines.push(city_line);
        }
        if let Some(ref country) = addr.country {
            lines.push(country.clone());
        }
    }
    lines
}

fn render_text(order: &OrderEmail) -> String {
    let mut text = format!(
        "Thank you for your order!\n\nOrder number: {}\nOrder date: {}\n\nItems:\n",
        order.order_number, order.order_date
    );
    for item in &order.items {
        text.push_str(&format!(
            "  {} x{} - {}\n",
            item.name,
            item.quantity,
            format_money(item.price * item.quantity as i64, &order.currency)
        ));
    }
    text.push_str(&format!(
        "\nTotal paid: {}\n",
        format_money(order.total, &order.currency)
    ));
    if let Some(ref address) = order.shipping_address {
        text.push_str("\nShipping to:\n");
        for line in shipping_lines(address) {
            text.push_str(&format!("  {}\n", line));
        }
    }
    text.push_str("\nWe'll let you know as soon as your order ships.\n");
    text
}

fn render_html(order: &OrderEmail) -> String {
    let items_html: String = order
        .items
        .iter()
        .map(|item| {
            format!(
                r#"<tr>
<td style="padding: 12px; border-bottom: 1px solid #e5e7eb;"><strong>{}</strong><br/>
<span style="color: #6b7280; font-size: 14px;">Quantity: {}</span></td>
<td style="padding: 12px; border-bottom: 1px solid #e5e7eb; text-align: right;">{}</td>
</tr>"#,
                item.name,
                item.quantity,
                format_money(item.price * item.quantity as i64, &order.currency)
            )
        })
        .collect();

    let shipping_html = order
        .shipping_address
        .as_ref()
        .map(|address| {
            format!(
                r#"<div style="background-color: #f9fafb; padding: 20px; border-radius: 8px; margin-bottom: 24px;">
<h2 style="margin-top: 0; font-size: 18px;">Shipping to</h2>
<p style="margin: 0; line-height: 1.6;">{}</p>
</div>"#,
                shipping_lines(address).join("<br/>")
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"></head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
<div style="text-align: center; margin-bottom: 30px;">
<h1 style="color: #10b981; margin: 0;">Order Confirmed</h1>
</div>
<div style="background-color: #f0fdf4; border-left: 4px solid #10b981; padding: 16px; margin-bottom: 24px; border-radius: 4px;">
<p style="margin: 0; color: #065f46;">Thank you for your order! Your payment has been received.</p>
</div>
<div style="background-color: #f9fafb; padding: 20px; border-radius: 8px; margin-bottom: 24px;">
<h2 style="margin-top: 0; font-size: 18px;">Order details</h2>
<table style="width: 100%; border-collapse: collapse;">
<tr><td style="padding: 8px 0; color: #6b7280;">Order number</td><td style="padding: 8px 0; text-align: right;"><strong>{order_number}</strong></td></tr>
<tr><td style="padding: 8px 0; color: #6b7280;">Order date</td><td style="padding: 8px 0; text-align: right;"><strong>{order_date}</strong></td></tr>
</table>
</div>
<div style="margin-bottom: 24px;">
<h2 style="font-size: 18px; margin-bottom: 12px;">Items ordered</h2>
<table style="width: 100%; border-collapse: collapse; background-color: white; border: 1px solid #e5e7eb; border-radius: 8px;">
{items}
<tr>
<td style="padding: 16px; background-color: #f0fdf4; font-weight: bold; font-size: 18px;">Total paid</td>
<td style="padding: 16px; background-color: #f0fdf4; text-align: right; font-weight: bold; font-size: 18px; color: #10b981;">{total}</td>
</tr>
</table>
</div>
{shipping}
<div style="text-align: center; padding-top: 24px; border-top: 1px solid #e5e7eb; color: #6b7280; font-size: 14px;">
<p>We'll let you know as soon as your order ships.</p>
</div>
</body>
</html>"#,
        order_number = order.order_number,
        order_date = order.order_date,
        items = items_html,
        total = format_money(order.total, &order.currency),
        shipping = shipping_html,
    )
}

fn render_admin_text(order: &OrderEmail) -> String {
    let mut text = format!(
        "New order {} ({})\nBuyer: {}\nTotal: {}\n\n",
        order.order_number,
        order.order_date,
        order.email,
        format_money(order.total, &order.currency)
    );
    for item in &order.items {
        text.push_str(&format!("  {}x {}\n", item.quantity, item.name));
    }
    text
}

fn render_admin_html(order: &OrderEmail) -> String {
    let items: String = order
        .items
        .iter()
        .map(|item| format!("{}&times; {}<br>", item.quantity, item.name))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; padding: 20px; max-width: 400px; margin: 0 auto;">
<div style="background-color: #10b981; color: white; padding: 12px; text-align: center; border-radius: 4px; margin-bottom: 16px;">
<strong style="font-size: 18px;">New order</strong>
</div>
<div style="background-color: #f9fafb; padding: 12px; border-radius: 4px; margin-bottom: 12px;">
<div style="margin-bottom: 8px;"><strong>{order_number}</strong> &bull; {order_date}</div>
<div style="color: #6b7280; font-size: 14px;">{buyer}</div>
</div>
<div style="background-color: #f0fdf4; padding: 12px; border-radius: 4px; margin-bottom: 12px;">
<strong style="color: #10b981; font-size: 20px;">{total}</strong>
</div>
<div style="font-size: 14px; color: #6b7280;">{items}</div>
</body>
</html>"#,
        order_number = order.order_number,
        order_date = order.order_date,
        buyer = order.email,
        total = format_money(order.total, &order.currency),
        items = items,
    )
}
