//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (order store reachable)
//!
//! # Checkout
//! POST /api/checkout                 - Validate address and place order
//! GET  /api/checkout                 - All checkout orders, newest first
//!
//! # Design orders
//! POST /api/upload                   - Multipart image upload + design order
//!
//! # Payments
//! POST /api/create-checkout-session  - Stripe Checkout session for a cart
//!
//! # Client config
//! GET  /api/config                   - Public Firebase web config
//! ```

pub mod checkout;
pub mod client_config;
pub mod health;
pub mod payments;
pub mod uploads;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::list).post(checkout::create))
        .route("/upload", post(uploads::upload))
        .route("/create-checkout-session", post(payments::create_session))
        .route("/config", get(client_config::show))
}

/// Create the complete application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
}
