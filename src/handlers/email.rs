//! Direct confirmation-email endpoint, used by the confirmation page when
//! the client assembles the receipt itself.

use axum::extract::State;
use serde::Serialize;

use crate::email::OrderEmail;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub email_id: String,
}

/// POST /api/send-confirmation-email
pub async fn send_confirmation_email(
    State(state): State<AppState>,
    Json(order): Json<OrderEmail>,
) -> Result<Json<SendEmailResponse>> {
    if order.email.trim().is_empty() || !order.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".into()));
    }
    if order.items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }

    let email_id = state.email.send_order_confirmation(&order).await?;

    Ok(Json(SendEmailResponse {
        success: true,
        email_id,
    }))
}
