//! Integration tests for Rolla.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rolla-integration-tests
//!
//! # Include the PostgreSQL-backed tests
//! DATABASE_URL=postgres://localhost/rolla_test \
//!     cargo test -p rolla-integration-tests -- --include-ignored
//! ```
//!
//! Each [`TestContext`] serves the real router on an ephemeral port. The
//! geocoder, repositories and object store are in-memory; Stripe is a local
//! fake when a test needs it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::routing::post;
use axum::{Form, Json, Router};
use secrecy::SecretString;
use serde_json::json;

use rolla_core::ValidatedAddress;
use rolla_server::config::{FirebaseConfig, StripeConfig};
use rolla_server::db::{InMemoryCheckoutOrderRepository, InMemoryDesignOrderRepository};
use rolla_server::geocoding::{AddressUnresolvable, AddressValidator};
use rolla_server::payments::StripeClient;
use rolla_server::state::{AppComponents, AppState};
use rolla_server::storage::InMemoryObjectStore;

/// The validator answer used across the checkout tests.
#[must_use]
pub fn toronto() -> ValidatedAddress {
    ValidatedAddress::new(
        "1 Main St, Toronto, ON M1M 1M1, Canada".to_string(),
        43.65,
        -79.38,
    )
}

/// Address validator with a fixed answer that records every lookup.
pub struct RecordingValidator {
    outcome: Result<ValidatedAddress, AddressUnresolvable>,
    lookups: Mutex<Vec<String>>,
}

impl RecordingValidator {
    #[must_use]
    pub const fn new(outcome: Result<ValidatedAddress, AddressUnresolvable>) -> Self {
        Self {
            outcome,
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Addresses looked up so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("lookups lock poisoned").clone()
    }
}

#[async_trait]
impl AddressValidator for RecordingValidator {
    async fn validate(&self, address: &str) -> Result<ValidatedAddress, AddressUnresolvable> {
        self.lookups
            .lock()
            .expect("lookups lock poisoned")
            .push(address.to_string());
        self.outcome.clone()
    }
}

/// Options for [`TestContext::spawn_with`].
pub struct TestOptions {
    pub validator_outcome: Result<ValidatedAddress, AddressUnresolvable>,
    pub payments: Option<StripeClient>,
    pub firebase: FirebaseConfig,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            validator_outcome: Ok(toronto()),
            payments: None,
            firebase: FirebaseConfig::default(),
        }
    }
}

/// A running server plus handles to its in-memory collaborators.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
    pub validator: Arc<RecordingValidator>,
    pub orders: InMemoryCheckoutOrderRepository,
    pub designs: InMemoryDesignOrderRepository,
    pub objects: InMemoryObjectStore,
}

impl TestContext {
    /// Serve the app with a validator that accepts every address.
    pub async fn spawn() -> Self {
        Self::spawn_with(TestOptions::default()).await
    }

    /// Serve the app with custom collaborators.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn_with(options: TestOptions) -> Self {
        let validator = Arc::new(RecordingValidator::new(options.validator_outcome));
        let orders = InMemoryCheckoutOrderRepository::new();
        let designs = InMemoryDesignOrderRepository::new();
        let objects = InMemoryObjectStore::new();

        let state = AppState::new(AppComponents {
            address_validator: validator.clone(),
            checkout_orders: Arc::new(orders.clone()),
            design_orders: Arc::new(designs.clone()),
            object_store: Some(Arc::new(objects.clone())),
            payments: options.payments,
            firebase: options.firebase,
        });
        let app = rolla_server::app(state, &[]);

        let base_url = serve(app).await;

        Self {
            client: reqwest::Client::new(),
            base_url,
            validator,
            orders,
            designs,
            objects,
        }
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Serve `router` on an ephemeral local port and return its origin.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read test listener address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server error");
    });
    format!("http://{addr}")
}

/// Form bodies received by a [`FakeStripe`], in arrival order.
pub type ReceivedForms = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Local stand-in for the Stripe Checkout Sessions endpoint.
pub struct FakeStripe {
    pub client: StripeClient,
    pub received: ReceivedForms,
}

impl FakeStripe {
    /// URL every fake session redirects to.
    pub const SESSION_URL: &'static str = "https://checkout.stripe.com/c/pay/cs_test_fake";

    /// Start the fake and build a client pointed at it.
    ///
    /// # Panics
    ///
    /// Panics if the fake cannot be served or the client cannot be built.
    pub async fn spawn() -> Self {
        let received: ReceivedForms = Arc::default();
        let sink = Arc::clone(&received);
        let router = Router::new().route(
            "/v1/checkout/sessions",
            post(move |Form(form): Form<HashMap<String, String>>| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().expect("forms lock poisoned").push(form);
                    Json(json!({ "id": "cs_test_fake", "url": Self::SESSION_URL }))
                }
            }),
        );
        let api_base = serve(router).await;

        let client = StripeClient::new(&StripeConfig {
            api_base,
            secret_key: SecretString::from("sk_test_4eC39HqLyjWDarjtT1zdp7dc"),
            currency: "cad".to_string(),
            success_url: "https://rolla-frontend.vercel.app/success".to_string(),
            cancel_url: "https://rolla-frontend.vercel.app/canceled".to_string(),
        })
        .expect("Failed to build Stripe client");

        Self { client, received }
    }

    /// Forms received so far.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn forms(&self) -> Vec<HashMap<String, String>> {
        self.received.lock().expect("forms lock poisoned").clone()
    }
}
