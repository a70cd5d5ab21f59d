//! Rolla Core - Shared domain types.
//!
//! This crate provides the types shared by every Rolla component:
//! - `server` - HTTP order-intake backend
//! - `cli` - Command-line tools for migrations and diagnostics
//! - `integration-tests` - End-to-end tests against an in-process server
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Anything that talks to the outside world lives in the
//! server crate behind a trait.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, checkout orders and design orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
