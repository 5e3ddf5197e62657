//! In-memory storage backend.
//!
//! All tables live behind one `tokio::sync::Mutex`, so every operation,
//! including the check-decrement-insert of order placement, is a single
//! critical section. Used for `STOREFRONT_STORAGE=memory` and in tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use market_core::{Email, OrderId, Price, ProductId, Quantity, UserId};

use super::{CatalogStore, OrderStore, RepositoryError, UserStore};
use crate::models::{LineItem, NewOrder, NewProduct, NewUser, Order, Product, User};

/// In-memory database shared by all clones.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, StoredUser>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    last_user_id: i32,
    last_product_id: i32,
    last_order_id: i32,
}

struct StoredUser {
    user: User,
    password_hash: String,
}

fn next_id(counter: &mut i32) -> Result<i32, RepositoryError> {
    *counter = counter
        .checked_add(1)
        .ok_or_else(|| RepositoryError::DataCorruption("id sequence exhausted".to_owned()))?;
    Ok(*counter)
}

impl MemoryStorage {
    /// Create an empty in-memory database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single product regardless of what the catalog holds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the id sequence is exhausted.
    pub async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let id = ProductId::new(next_id(&mut tables.last_product_id)?);
        let product = Product {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            created_at: Utc::now(),
        };
        tables.products.insert(id, product.clone());
        Ok(product)
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;

        if let Some(existing) = tables.users.values().find(|stored| {
            stored.user.email == user.email || stored.user.username == user.username
        }) {
            let constraint = if existing.user.email == user.email {
                "users_email_key"
            } else {
                "users_username_key"
            };
            return Err(RepositoryError::Conflict(constraint.to_owned()));
        }

        let id = UserId::new(next_id(&mut tables.last_user_id)?);
        let created = User {
            id,
            username: user.username,
            email: user.email,
            created_at: Utc::now(),
        };
        tables.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(created)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|stored| &stored.user.email == email)
            .map(|stored| (stored.user.clone(), stored.password_hash.clone())))
    }
}

#[async_trait]
impl CatalogStore for MemoryStorage {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn insert_if_empty(&self, products: &[NewProduct]) -> Result<usize, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.products.is_empty() {
            return Ok(0);
        }

        for product in products {
            let id = ProductId::new(next_id(&mut tables.last_product_id)?);
            tables.products.insert(
                id,
                Product {
                    id,
                    name: product.name.clone(),
                    description: product.description.clone(),
                    price: product.price,
                    stock: product.stock,
                    created_at: Utc::now(),
                },
            );
        }
        Ok(products.len())
    }

    async fn restock(
        &self,
        id: ProductId,
        quantity: Quantity,
    ) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;

        let stock = product
            .stock
            .checked_add(quantity.get())
            .filter(|stock| *stock <= Quantity::MAX)
            .ok_or_else(|| RepositoryError::Conflict("stock would overflow".to_owned()))?;
        product.stock = stock;
        Ok(product.clone())
    }

    async fn set_price(&self, id: ProductId, price: Price) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        product.price = price;
        Ok(product.clone())
    }
}

#[async_trait]
impl OrderStore for MemoryStorage {
    async fn place(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tables = self.tables.lock().await;

        let product = tables
            .products
            .get(&order.product_id)
            .ok_or(RepositoryError::NotFound)?;
        if !product.has_stock_for(order.quantity) {
            return Err(RepositoryError::InsufficientStock {
                requested: order.quantity.get(),
                available: product.stock,
            });
        }

        let item = LineItem {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: order.quantity,
        };

        // Allocate the id before touching stock so a failure leaves nothing behind
        let id = OrderId::new(next_id(&mut tables.last_order_id)?);

        if let Some(product) = tables.products.get_mut(&order.product_id) {
            product.stock -= order.quantity.get();
        }

        let placed = Order {
            id,
            user_id: order.user_id,
            items: vec![item],
            shipping: order.shipping,
            created_at: Utc::now(),
        };
        tables.orders.insert(id, placed.clone());
        Ok(placed)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.orders.get(&id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables.lock().await;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(tables
            .orders
            .values()
            .rev()
            .filter(|order| order.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
