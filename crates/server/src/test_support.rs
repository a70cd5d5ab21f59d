//! Shared fixtures for handler tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response, header};
use serde_json::{Value, json};

use rolla_core::{CheckoutOrder, NewCheckoutOrder, ValidatedAddress};

use crate::config::FirebaseConfig;
use crate::db::{
    CheckoutOrderRepository, InMemoryCheckoutOrderRepository, InMemoryDesignOrderRepository,
    RepositoryError,
};
use crate::geocoding::{AddressUnresolvable, AddressValidator};
use crate::state::{AppComponents, AppState};
use crate::storage::InMemoryObjectStore;

/// Validator with a fixed answer.
pub struct FixedValidator(pub Result<ValidatedAddress, AddressUnresolvable>);

#[async_trait]
impl AddressValidator for FixedValidator {
    async fn validate(&self, _address: &str) -> Result<ValidatedAddress, AddressUnresolvable> {
        self.0.clone()
    }
}

/// Order store that is always down.
pub struct UnreachableOrders;

#[async_trait]
impl CheckoutOrderRepository for UnreachableOrders {
    async fn create(&self, _order: NewCheckoutOrder) -> Result<CheckoutOrder, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<CheckoutOrder>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }
}

pub fn toronto() -> ValidatedAddress {
    ValidatedAddress::new(
        "1 Main St, Toronto, ON M1M 1M1, Canada".to_string(),
        43.65,
        -79.38,
    )
}

pub fn toronto_checkout() -> Value {
    json!({
        "cartItems": [{ "name": "Tee", "price": 20, "quantity": 2 }],
        "total": 40,
        "address": {
            "street": "1 Main St",
            "city": "Toronto",
            "postalCode": "M1M1M1",
            "country": "Canada"
        }
    })
}

/// Router over in-memory collaborators, with handles to inspect them.
pub struct TestApp {
    pub state: AppState,
    pub orders: InMemoryCheckoutOrderRepository,
    pub designs: InMemoryDesignOrderRepository,
    pub objects: InMemoryObjectStore,
}

#[derive(Default)]
pub struct TestAppBuilder {
    reject_addresses: bool,
    orders_unreachable: bool,
    firebase: FirebaseConfig,
}

impl TestAppBuilder {
    pub fn rejecting_addresses(mut self) -> Self {
        self.reject_addresses = true;
        self
    }

    pub fn orders_unreachable(mut self) -> Self {
        self.orders_unreachable = true;
        self
    }

    pub fn firebase(mut self, firebase: FirebaseConfig) -> Self {
        self.firebase = firebase;
        self
    }

    pub fn build(self) -> TestApp {
        let orders = InMemoryCheckoutOrderRepository::new();
        let designs = InMemoryDesignOrderRepository::new();
        let objects = InMemoryObjectStore::new();
        let outcome = if self.reject_addresses {
            Err(AddressUnresolvable)
        } else {
            Ok(toronto())
        };
        let checkout_orders: Arc<dyn CheckoutOrderRepository> = if self.orders_unreachable {
            Arc::new(UnreachableOrders)
        } else {
            Arc::new(orders.clone())
        };

        let state = AppState::new(AppComponents {
            address_validator: Arc::new(FixedValidator(outcome)),
            checkout_orders,
            design_orders: Arc::new(designs.clone()),
            object_store: Some(Arc::new(objects.clone())),
            payments: None,
            firebase: self.firebase,
        });

        TestApp {
            state,
            orders,
            designs,
            objects,
        }
    }
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    pub fn accepting() -> Self {
        Self::builder().build()
    }

    pub fn rejecting() -> Self {
        Self::builder().rejecting_addresses().build()
    }

    pub fn router(&self) -> Router {
        crate::app(self.state.clone(), &[])
    }
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
