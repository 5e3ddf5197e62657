//! Product repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};

use market_core::{Price, ProductId, Quantity};

use super::{CatalogStore, RepositoryError, non_negative, to_db_count};
use crate::models::{NewProduct, Product};

/// Repository for product database operations.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    stock: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: non_negative(row.stock, "stock")?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CatalogStore for ProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, created_at
            FROM market.products
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, created_at
            FROM market.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    async fn insert_if_empty(&self, products: &[NewProduct]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Two instances starting at once must not both seed
        sqlx::query("LOCK TABLE market.products IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM market.products")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.rollback().await?;
            return Ok(0);
        }

        for product in products {
            sqlx::query(
                r"
                INSERT INTO market.products (name, description, price, stock)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(to_db_count(product.stock)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(inserted = products.len(), "Seeded product catalog");
        Ok(products.len())
    }

    #[instrument(skip(self), fields(product_id = %id, quantity = %quantity))]
    async fn restock(
        &self,
        id: ProductId,
        quantity: Quantity,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE market.products
            SET stock = stock + $2
            WHERE id = $1
            RETURNING id, name, description, price, stock, created_at
            ",
        )
        .bind(id)
        .bind(to_db_count(quantity.get())?)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    #[instrument(skip(self), fields(product_id = %id, price = %price))]
    async fn set_price(&self, id: ProductId, price: Price) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE market.products
            SET price = $2
            WHERE id = $1
            RETURNING id, name, description, price, stock, created_at
            ",
        )
        .bind(id)
        .bind(price)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }
}
