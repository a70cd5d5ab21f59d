//! Persistence for checkout orders and design orders.
//!
//! # Database: `rolla`
//!
//! ## Tables
//!
//! - `rolla.checkout_orders` - Cart snapshots with geocoded shipping address.
//!   `items` and `address` are schemaless `JSONB` documents.
//! - `rolla.design_orders` - Uploaded artwork URLs and free text
//!
//! Each repository is a trait with a `PostgreSQL` implementation and an
//! in-memory implementation for tests and local development. Handlers only
//! ever see `Arc<dyn ...Repository>`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p rolla-cli -- migrate
//! ```

pub mod checkout_orders;
pub mod design_orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use checkout_orders::{
    CheckoutOrderRepository, InMemoryCheckoutOrderRepository, PgCheckoutOrderRepository,
};
pub use design_orders::{
    DesignOrderRepository, InMemoryDesignOrderRepository, PgDesignOrderRepository,
};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backing store could not be reached (non-sqlx stores).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Round-trip a trivial query to check connectivity.
pub(crate) async fn ping(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
