//! Checkout route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use rolla_core::{CheckoutOrder, CheckoutOrderId, ValidatedAddress};

use crate::error::{Result, add_breadcrumb};
use crate::extract::ValidatedJson;
use crate::services::CheckoutRequest;
use crate::state::AppState;

/// Confirmation message for a placed order.
pub const ORDER_PLACED_MESSAGE: &str = "Order placed successfully!";

/// Body of a successful `POST /api/checkout`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub order_id: CheckoutOrderId,
    pub validated_address: ValidatedAddress,
}

/// Place a checkout order.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let created = state.checkout().submit(request).await?;

    let order_id = created.order_id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: ORDER_PLACED_MESSAGE,
            order_id: created.order_id,
            validated_address: created.validated_address,
        }),
    ))
}

/// List every checkout order, newest first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CheckoutOrder>>> {
    let orders = state.checkout_orders().list_all().await?;
    tracing::debug!(count = orders.len(), "Listed checkout orders");
    Ok(Json(orders))
}
