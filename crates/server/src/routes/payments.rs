//! Payment session route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::payments::{LineItem, PaymentError};
use crate::services::CartItemInput;
use crate::state::AppState;

/// Body of `POST /api/create-checkout-session`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub cart_items: Option<Vec<CartItemInput>>,
}

/// Hosted checkout URL to redirect the browser to.
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub url: String,
}

/// Create a Stripe Checkout session for the submitted cart.
#[instrument(skip(state, request))]
pub async fn create_session(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>> {
    let items: Vec<LineItem> = request
        .cart_items
        .unwrap_or_default()
        .into_iter()
        .map(|item| LineItem {
            name: item.name,
            unit_price: item.price,
            quantity: item.quantity,
        })
        .collect();

    if items.is_empty() {
        return Err(AppError::Validation("Cart is empty".to_string()));
    }

    let stripe = state.payments().ok_or(PaymentError::NotConfigured)?;
    let url = stripe.create_checkout_session(&items).await?;

    Ok(Json(CreateSessionResponse { url }))
}
