//! Newsletter signup backed by a Resend audience.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub message: &'static str,
}

/// POST /api/newsletter
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".into()));
    }

    state.email.subscribe_contact(email).await?;
    tracing::info!(email = %email, "newsletter subscription added");

    Ok(Json(SubscribeResponse {
        message: "Successfully subscribed",
    }))
}
