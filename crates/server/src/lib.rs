//! Rolla order-intake server.
//!
//! Accepts checkout orders (cart + shipping address) and design orders
//! (uploaded artwork + text), validates shipping addresses against the Google
//! Geocoding API, and creates Stripe Checkout sessions.
//!
//! # Architecture
//!
//! - Axum web framework, JSON API only
//! - `PostgreSQL` for orders (`JSONB` documents for items and addresses)
//! - Google Geocoding API for address validation
//! - Amazon S3 for uploaded images
//! - Stripe for payment sessions
//!
//! The binary in `main.rs` loads [`config::AppConfig`], builds
//! [`state::AppState`] and serves [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod geocoding;
pub mod middleware;
pub mod payments;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_support;

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Largest accepted request body (JSON or multipart), in bytes.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Build the full application: routes, middleware and Sentry layers.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(middleware::cors_layer(allowed_origins))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
