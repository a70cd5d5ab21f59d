//! Design order repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use rolla_core::{DesignOrder, DesignOrderId, NewDesignOrder};

use super::RepositoryError;

/// Storage for design orders.
#[async_trait]
pub trait DesignOrderRepository: Send + Sync {
    /// Persist a new design order, assigning its identifier and creation time.
    async fn create(&self, order: NewDesignOrder) -> Result<DesignOrder, RepositoryError>;
}

/// `PostgreSQL`-backed design order repository.
#[derive(Clone)]
pub struct PgDesignOrderRepository {
    pool: PgPool,
}

impl PgDesignOrderRepository {
    /// Create a new repository over a shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DesignOrderRow {
    id: DesignOrderId,
    image_url: Option<String>,
    image_url2: Option<String>,
    text: String,
    text2: String,
    created_at: DateTime<Utc>,
}

impl From<DesignOrderRow> for DesignOrder {
    fn from(row: DesignOrderRow) -> Self {
        Self {
            id: row.id,
            image_url: row.image_url,
            image_url2: row.image_url2,
            text: row.text,
            text2: row.text2,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl DesignOrderRepository for PgDesignOrderRepository {
    async fn create(&self, order: NewDesignOrder) -> Result<DesignOrder, RepositoryError> {
        let row = sqlx::query_as::<_, DesignOrderRow>(
            r"
            INSERT INTO rolla.design_orders (image_url, image_url2, text, text2)
            VALUES ($1, $2, $3, $4)
            RETURNING id, image_url, image_url2, text, text2, created_at
            ",
        )
        .bind(&order.image_url)
        .bind(&order.image_url2)
        .bind(&order.text)
        .bind(&order.text2)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}

/// In-memory design order repository.
#[derive(Clone, Default)]
pub struct InMemoryDesignOrderRepository {
    orders: Arc<RwLock<Vec<DesignOrder>>>,
}

impl InMemoryDesignOrderRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored design orders in insertion order.
    pub async fn all(&self) -> Vec<DesignOrder> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl DesignOrderRepository for InMemoryDesignOrderRepository {
    async fn create(&self, order: NewDesignOrder) -> Result<DesignOrder, RepositoryError> {
        let stored = DesignOrder::from_new(DesignOrderId::generate(), order, Utc::now());
        self.orders.write().await.push(stored.clone());
        Ok(stored)
    }
}
