//! Order repository for `PostgreSQL`.
//!
//! Order placement runs in a single transaction built around a conditional
//! decrement:
//!
//! ```sql
//! UPDATE market.products SET stock = stock - $2
//! WHERE id = $1 AND stock >= $2
//! RETURNING ...
//! ```
//!
//! The update takes the row lock, so concurrent orders for the same product
//! queue behind each other and the second one re-evaluates `stock >= $2`
//! against the committed value. The name and price snapshot is read from the
//! same locked row.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use market_core::{OrderId, Price, ProductId, Quantity, ShippingInfo, UserId};

use super::{OrderStore, RepositoryError, non_negative, to_db_count};
use crate::models::{LineItem, NewOrder, Order};

/// Repository for order database operations.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<OrderId, Vec<LineItem>>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, product_id, name, price, quantity
            FROM market.order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            ",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<OrderId, Vec<LineItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            items
                .entry(order_id)
                .or_default()
                .push(LineItem::try_from(row)?);
        }
        Ok(items)
    }
}

#[derive(sqlx::FromRow)]
struct ReservedProductRow {
    name: String,
    price: Price,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    address: String,
    city: String,
    postal_code: String,
    country: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    product_id: ProductId,
    name: String,
    price: Price,
    quantity: i32,
}

impl TryFrom<OrderItemRow> for LineItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(non_negative(row.quantity, "quantity")?).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid line item quantity: {e}"))
        })?;

        Ok(Self {
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            quantity,
        })
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<LineItem>) -> Result<Order, RepositoryError> {
        let shipping =
            ShippingInfo::parse(&self.address, &self.city, &self.postal_code, &self.country)
                .map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid shipping info: {e}"))
                })?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items,
            shipping,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    #[instrument(
        skip(self, order),
        fields(product_id = %order.product_id, quantity = %order.quantity, user_id = %order.user_id)
    )]
    async fn place(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let quantity = to_db_count(order.quantity.get())?;
        let mut tx = self.pool.begin().await?;

        let reserved = sqlx::query_as::<_, ReservedProductRow>(
            r"
            UPDATE market.products
            SET stock = stock - $2
            WHERE id = $1 AND stock >= $2
            RETURNING name, price
            ",
        )
        .bind(order.product_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(reserved) = reserved else {
            let available: Option<(i32,)> =
                sqlx::query_as("SELECT stock FROM market.products WHERE id = $1")
                    .bind(order.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Err(match available {
                None => RepositoryError::NotFound,
                Some((stock,)) => RepositoryError::InsufficientStock {
                    requested: order.quantity.get(),
                    available: non_negative(stock, "stock")?,
                },
            });
        };

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO market.orders (user_id, address, city, postal_code, country)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, address, city, postal_code, country, created_at
            ",
        )
        .bind(order.user_id)
        .bind(order.shipping.address())
        .bind(order.shipping.city())
        .bind(order.shipping.postal_code())
        .bind(order.shipping.country())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO market.order_items (order_id, position, product_id, name, price, quantity)
            VALUES ($1, 0, $2, $3, $4, $5)
            ",
        )
        .bind(row.id)
        .bind(order.product_id)
        .bind(&reserved.name)
        .bind(reserved.price)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(order_id = %row.id, "Order committed");

        let items = vec![LineItem {
            product_id: order.product_id,
            name: reserved.name,
            price: reserved.price,
            quantity: order.quantity,
        }];
        row.into_order(items)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, address, city, postal_code, country, created_at
            FROM market.orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items = self.load_items(&[row.id.as_i32()]).await?;
        let order_items = items.remove(&row.id).unwrap_or_default();
        row.into_order(order_items).map(Some)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, address, city, postal_code, country, created_at
            FROM market.orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();
        let mut items = self.load_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }
}
