//! Checkout workflow: validate, geocode, persist, respond.
//!
//! Steps run strictly in order and the first failure ends the request.
//! Nothing is written unless the geocoder accepted the address.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use rolla_core::{
    CheckoutOrderId, NewCheckoutOrder, OrderAddress, OrderItem, Price, ValidatedAddress,
};

use crate::db::{CheckoutOrderRepository, RepositoryError};
use crate::geocoding::AddressValidator;

/// One cart line as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemInput {
    pub name: String,
    pub price: Price,
    pub quantity: i64,
    #[serde(default)]
    pub size: Option<String>,
}

/// Shipping address as submitted. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart_items: Vec<CartItemInput>,
    pub total: Price,
    #[serde(default)]
    pub address: Option<AddressInput>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedOrder {
    pub order_id: CheckoutOrderId,
    pub validated_address: ValidatedAddress,
}

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// street, city, postalCode or country missing or empty.
    #[error("All address fields are required.")]
    MissingAddressFields,

    /// The geocoder could not resolve the address.
    #[error("Invalid address. Please enter a valid one.")]
    AddressInvalid,

    /// The order could not be stored.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// An address with all four fields present and non-empty.
#[derive(Debug)]
struct ShippingAddress {
    street: String,
    city: String,
    postal_code: String,
    country: String,
}

impl ShippingAddress {
    fn from_input(input: Option<AddressInput>) -> Result<Self, CheckoutError> {
        let input = input.ok_or(CheckoutError::MissingAddressFields)?;
        Ok(Self {
            street: required(input.street)?,
            city: required(input.city)?,
            postal_code: required(input.postal_code)?,
            country: required(input.country)?,
        })
    }

    /// Single-line form handed to the geocoder.
    fn single_line(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.street, self.city, self.postal_code, self.country
        )
    }
}

fn required(field: Option<String>) -> Result<String, CheckoutError> {
    field
        .filter(|value| !value.is_empty())
        .ok_or(CheckoutError::MissingAddressFields)
}

/// Runs the checkout workflow against injected collaborators.
#[derive(Clone)]
pub struct CheckoutService {
    validator: Arc<dyn AddressValidator>,
    orders: Arc<dyn CheckoutOrderRepository>,
}

impl CheckoutService {
    #[must_use]
    pub fn new(
        validator: Arc<dyn AddressValidator>,
        orders: Arc<dyn CheckoutOrderRepository>,
    ) -> Self {
        Self { validator, orders }
    }

    /// Place an order for `request`.
    ///
    /// `total` is stored as given and never reconciled with the items.
    /// Resubmitting the same payload creates another order.
    ///
    /// # Errors
    ///
    /// - `MissingAddressFields` before any external call
    /// - `AddressInvalid` if the geocoder rejects the address; nothing is stored
    /// - `Repository` if the write fails
    #[instrument(skip_all, fields(items = request.cart_items.len()))]
    pub async fn submit(&self, request: CheckoutRequest) -> Result<CreatedOrder, CheckoutError> {
        let address = ShippingAddress::from_input(request.address)?;

        let validated = self
            .validator
            .validate(&address.single_line())
            .await
            .map_err(|_| CheckoutError::AddressInvalid)?;

        let items = request
            .cart_items
            .into_iter()
            .map(|item| OrderItem::snapshot(item.name, item.price, item.quantity, item.size))
            .collect();

        let draft = NewCheckoutOrder {
            items,
            total_amount: request.total,
            address: OrderAddress::new(
                address.street,
                address.city,
                address.postal_code,
                address.country,
                &validated,
            ),
        };

        let order = self.orders.create(draft).await?;
        tracing::info!(order_id = %order.id, "Checkout order stored");

        Ok(CreatedOrder {
            order_id: order.id,
            validated_address: validated,
        })
    }
}
