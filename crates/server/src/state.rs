//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{AppConfig, FirebaseConfig};
use crate::db::{
    CheckoutOrderRepository, DesignOrderRepository, PgCheckoutOrderRepository,
    PgDesignOrderRepository,
};
use crate::geocoding::{AddressValidator, GeocodingError, GoogleGeocoder};
use crate::payments::{PaymentError, StripeClient};
use crate::services::{CheckoutService, UploadService};
use crate::storage::{ObjectStore, S3ObjectStore};

/// Error building application state from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("geocoder: {0}")]
    Geocoding(#[from] GeocodingError),
    #[error("payments: {0}")]
    Payments(#[from] PaymentError),
}

/// Collaborators the application is assembled from.
///
/// Production wiring lives in [`AppState::from_config`]; tests fill this in
/// with in-memory implementations.
pub struct AppComponents {
    pub address_validator: Arc<dyn AddressValidator>,
    pub checkout_orders: Arc<dyn CheckoutOrderRepository>,
    pub design_orders: Arc<dyn DesignOrderRepository>,
    pub object_store: Option<Arc<dyn ObjectStore>>,
    pub payments: Option<StripeClient>,
    pub firebase: FirebaseConfig,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    checkout: CheckoutService,
    uploads: UploadService,
    checkout_orders: Arc<dyn CheckoutOrderRepository>,
    payments: Option<StripeClient>,
    firebase: FirebaseConfig,
}

impl AppState {
    /// Assemble state from explicit collaborators.
    #[must_use]
    pub fn new(components: AppComponents) -> Self {
        let AppComponents {
            address_validator,
            checkout_orders,
            design_orders,
            object_store,
            payments,
            firebase,
        } = components;

        Self {
            inner: Arc::new(AppStateInner {
                checkout: CheckoutService::new(address_validator, Arc::clone(&checkout_orders)),
                uploads: UploadService::new(object_store, design_orders),
                checkout_orders,
                payments,
                firebase,
            }),
        }
    }

    /// Wire production collaborators: Google geocoder, `PostgreSQL`
    /// repositories over `pool`, and S3 / Stripe when configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the geocoding or payments client cannot be built.
    pub fn from_config(config: &AppConfig, pool: PgPool) -> Result<Self, StateError> {
        let geocoder = GoogleGeocoder::new(&config.geocoding)?;

        let object_store = config.object_storage.as_ref().map(|storage| {
            tracing::info!(bucket = %storage.bucket, "Object storage enabled");
            Arc::new(S3ObjectStore::new(storage)) as Arc<dyn ObjectStore>
        });
        if object_store.is_none() {
            tracing::warn!("AWS_BUCKET_NAME not set, image uploads disabled");
        }

        let payments = config
            .stripe
            .as_ref()
            .map(StripeClient::new)
            .transpose()?;
        if payments.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY not set, payment sessions disabled");
        }

        Ok(Self::new(AppComponents {
            address_validator: Arc::new(geocoder),
            checkout_orders: Arc::new(PgCheckoutOrderRepository::new(pool.clone())),
            design_orders: Arc::new(PgDesignOrderRepository::new(pool)),
            object_store,
            payments,
            firebase: config.firebase.clone(),
        }))
    }

    /// Get the checkout workflow.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    /// Get the design upload service.
    #[must_use]
    pub fn uploads(&self) -> &UploadService {
        &self.inner.uploads
    }

    /// Get the checkout order repository.
    #[must_use]
    pub fn checkout_orders(&self) -> &dyn CheckoutOrderRepository {
        self.inner.checkout_orders.as_ref()
    }

    /// Get the Stripe client, if payments are configured.
    #[must_use]
    pub fn payments(&self) -> Option<&StripeClient> {
        self.inner.payments.as_ref()
    }

    /// Get the public Firebase client configuration.
    #[must_use]
    pub fn firebase(&self) -> &FirebaseConfig {
        &self.inner.firebase
    }
}
