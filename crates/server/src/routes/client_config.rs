//! Public client configuration.

use axum::{Json, extract::State};

use crate::config::FirebaseConfig;
use crate::state::AppState;

/// Firebase web configuration for the browser client. Unset values are `null`.
pub async fn show(State(state): State<AppState>) -> Json<FirebaseConfig> {
    Json(state.firebase().clone())
}
