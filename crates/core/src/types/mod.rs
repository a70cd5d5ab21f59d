//! Core types for Rolla.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod checkout;
pub mod design;
pub mod id;
pub mod price;

pub use checkout::{
    CheckoutOrder, DEFAULT_ITEM_SIZE, NewCheckoutOrder, OrderAddress, OrderItem, ValidatedAddress,
};
pub use design::{DesignOrder, NewDesignOrder};
pub use id::*;
pub use price::{Price, PriceError};
