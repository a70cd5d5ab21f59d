//! Checkout order domain model.
//!
//! A checkout order is a snapshot: item names and prices are copied from the
//! cart at submission time and never refer back to a catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::CheckoutOrderId;
use super::price::Price;

/// Size recorded for items submitted without one.
pub const DEFAULT_ITEM_SIZE: &str = "N/A";

/// A line item as stored on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub price: Price,
    /// Copied verbatim from the cart; zero and negative values are kept.
    pub quantity: i64,
    pub size: String,
}

impl OrderItem {
    /// Build a snapshot, substituting [`DEFAULT_ITEM_SIZE`] for a missing or
    /// empty size.
    #[must_use]
    pub fn snapshot(name: String, price: Price, quantity: i64, size: Option<String>) -> Self {
        let size = size
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ITEM_SIZE.to_owned());
        Self {
            name,
            price,
            quantity,
            size,
        }
    }
}

/// Normalized address and coordinates returned by a geocoder.
///
/// Only address validators construct this; request handlers never build one
/// from client input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedAddress {
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ValidatedAddress {
    /// Create a validated address from a geocoder result.
    #[must_use]
    pub const fn new(formatted_address: String, latitude: f64, longitude: f64) -> Self {
        Self {
            formatted_address,
            latitude,
            longitude,
        }
    }
}

/// Shipping address stored on an order: the fields as submitted plus the
/// coordinates the geocoder resolved them to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl OrderAddress {
    /// Combine submitted address fields with geocoded coordinates.
    #[must_use]
    pub const fn new(
        street: String,
        city: String,
        postal_code: String,
        country: String,
        validated: &ValidatedAddress,
    ) -> Self {
        Self {
            street,
            city,
            postal_code,
            country,
            latitude: validated.latitude,
            longitude: validated.longitude,
        }
    }
}

/// An order that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckoutOrder {
    pub items: Vec<OrderItem>,
    /// Supplied by the client; not reconciled with the item prices.
    pub total_amount: Price,
    pub address: OrderAddress,
}

/// A persisted checkout order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    #[serde(rename = "_id")]
    pub id: CheckoutOrderId,
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    pub address: OrderAddress,
    pub created_at: DateTime<Utc>,
}

impl CheckoutOrder {
    /// Attach the repository-assigned identity to a draft.
    #[must_use]
    pub fn from_new(id: CheckoutOrderId, order: NewCheckoutOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            items: order.items,
            total_amount: order.total_amount,
            address: order.address,
            created_at,
        }
    }
}
