//! Stripe Checkout session creation.
//!
//! One form-encoded `POST /v1/checkout/sessions` per call. The caller gets
//! back the hosted checkout URL to redirect the browser to.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use rolla_core::{Price, PriceError};

use crate::config::StripeConfig;

/// Path of the Checkout Sessions endpoint relative to the API origin.
const CHECKOUT_SESSIONS_PATH: &str = "/v1/checkout/sessions";

/// Errors that can occur when creating a payment session.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint could not be built from the configured API base.
    #[error("invalid payments URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Stripe returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A line item price cannot be expressed in minor units.
    #[error("invalid line item amount: {0}")]
    Amount(#[from] PriceError),

    /// Session was created without a hosted checkout URL.
    #[error("checkout session {0} has no URL")]
    MissingUrl(String),

    /// No Stripe secret key configured.
    #[error("payments are not configured")]
    NotConfigured,
}

/// A product line on a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub unit_price: Price,
    pub quantity: i64,
}

/// A created checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Stripe API client for Checkout sessions.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    endpoint: Url,
    secret_key: SecretString,
    currency: String,
    success_url: String,
    cancel_url: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("secret_key", &"[REDACTED]")
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns error if the API base is not a valid URL or the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentError> {
        let endpoint = Url::parse(&config.api_base)?.join(CHECKOUT_SESSIONS_PATH)?;
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            endpoint,
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        })
    }

    /// Create a hosted checkout session and return its redirect URL.
    ///
    /// # Errors
    ///
    /// Returns error if an amount cannot be converted to cents, the request
    /// fails, Stripe rejects it, or the session carries no URL.
    #[instrument(skip(self, items), fields(line_items = items.len()))]
    pub async fn create_checkout_session(&self, items: &[LineItem]) -> Result<String, PaymentError> {
        let form = self.session_form(items)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response.json().await?;
        tracing::info!(session_id = %session.id, "Checkout session created");

        session.url.ok_or(PaymentError::MissingUrl(session.id))
    }

    /// Form body for a Checkout session in Stripe's bracketed key notation.
    fn session_form(&self, items: &[LineItem]) -> Result<Vec<(String, String)>, PaymentError> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
        ];

        for (i, item) in items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            form.push((
                format!("{prefix}[price_data][currency]"),
                self.currency.clone(),
            ));
            form.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("{prefix}[price_data][unit_amount]"),
                item.unit_price.to_minor_units()?.to_string(),
            ));
            form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }

        form.push(("success_url".to_string(), self.success_url.clone()));
        form.push(("cancel_url".to_string(), self.cancel_url.clone()));
        Ok(form)
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: String,
}
