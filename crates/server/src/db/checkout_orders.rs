//! Checkout order repository.
//!
//! Orders are written exactly once and never updated or deleted. Listing
//! returns the whole collection, newest first.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tokio::sync::RwLock;

use rolla_core::{CheckoutOrder, CheckoutOrderId, NewCheckoutOrder, OrderAddress, OrderItem, Price};

use super::RepositoryError;

/// Storage for checkout orders.
#[async_trait]
pub trait CheckoutOrderRepository: Send + Sync {
    /// Persist a new order, assigning its identifier and creation time.
    async fn create(&self, order: NewCheckoutOrder) -> Result<CheckoutOrder, RepositoryError>;

    /// Every stored order, newest first.
    async fn list_all(&self) -> Result<Vec<CheckoutOrder>, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// `PostgreSQL`-backed checkout order repository.
#[derive(Clone)]
pub struct PgCheckoutOrderRepository {
    pool: PgPool,
}

impl PgCheckoutOrderRepository {
    /// Create a new repository over a shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CheckoutOrderRow {
    id: CheckoutOrderId,
    items: Json<Vec<OrderItem>>,
    total_amount: Price,
    address: Json<OrderAddress>,
    created_at: DateTime<Utc>,
}

impl From<CheckoutOrderRow> for CheckoutOrder {
    fn from(row: CheckoutOrderRow) -> Self {
        Self {
            id: row.id,
            items: row.items.0,
            total_amount: row.total_amount,
            address: row.address.0,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CheckoutOrderRepository for PgCheckoutOrderRepository {
    async fn create(&self, order: NewCheckoutOrder) -> Result<CheckoutOrder, RepositoryError> {
        let row = sqlx::query_as::<_, CheckoutOrderRow>(
            r"
            INSERT INTO rolla.checkout_orders (items, total_amount, address)
            VALUES ($1, $2, $3)
            RETURNING id, items, total_amount, address, created_at
            ",
        )
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(Json(&order.address))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_all(&self) -> Result<Vec<CheckoutOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, CheckoutOrderRow>(
            r"
            SELECT id, items, total_amount, address, created_at
            FROM rolla.checkout_orders
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CheckoutOrder::from).collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        super::ping(&self.pool).await
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// In-memory checkout order repository.
///
/// Cheap to clone; clones share the same orders.
#[derive(Clone, Default)]
pub struct InMemoryCheckoutOrderRepository {
    orders: Arc<RwLock<Vec<CheckoutOrder>>>,
}

impl InMemoryCheckoutOrderRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Whether no order has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl CheckoutOrderRepository for InMemoryCheckoutOrderRepository {
    async fn create(&self, order: NewCheckoutOrder) -> Result<CheckoutOrder, RepositoryError> {
        let stored = CheckoutOrder::from_new(CheckoutOrderId::generate(), order, Utc::now());
        self.orders.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<CheckoutOrder>, RepositoryError> {
        let mut orders: Vec<CheckoutOrder> =
            self.orders.read().await.iter().rev().cloned().collect();
        // Stable sort keeps later inserts first when timestamps tie
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
