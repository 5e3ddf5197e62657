//! Storage layer for the storefront.
//!
//! # Collaborators
//!
//! Handlers and services never talk to a database directly. They go through
//! three storage traits, bundled in [`Storage`]:
//!
//! - [`UserStore`] - sign-up and login lookups
//! - [`CatalogStore`] - product reads, seeding and restocking
//! - [`OrderStore`] - atomic order placement and order reads
//!
//! # Backends
//!
//! - `PostgreSQL` (`users`, `products`, `orders` modules), schema `market`
//! - In-memory ([`memory`]), used for `STOREFRONT_STORAGE=memory` and tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p market-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use market_core::{Email, OrderId, Price, ProductId, Quantity, UserId};

use crate::models::{NewOrder, NewProduct, NewUser, Order, Product, User};

pub use memory::MemoryStorage;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A conditional stock decrement found fewer units than requested.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Units asked for.
        requested: u32,
        /// Units left at the time of the attempt.
        available: u32,
    },
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user.
    ///
    /// Returns `RepositoryError::Conflict` if the email or username is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Get a user by ID.
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Get a user together with their password hash, by email.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
}

/// Product persistence.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products, ordered by ID.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// One product by ID.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert `products` only if the catalog is empty. Returns how many were inserted.
    async fn insert_if_empty(&self, products: &[NewProduct]) -> Result<usize, RepositoryError>;

    /// Add units to a product's stock.
    async fn restock(&self, id: ProductId, quantity: Quantity)
    -> Result<Product, RepositoryError>;

    /// Change a product's current price. Existing orders keep their snapshot.
    async fn set_price(&self, id: ProductId, price: Price) -> Result<Product, RepositoryError>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Place an order as one atomic unit.
    ///
    /// Decrements the product's stock only if at least `quantity` units are
    /// left, snapshots the product's name and price, and inserts the order.
    /// Either all of it happens or none of it does.
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist and
    /// `RepositoryError::InsufficientStock` if the decrement would go negative.
    async fn place(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// One order by ID.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// A user's most recent orders, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Order>, RepositoryError>;
}

#[derive(Clone)]
enum Backend {
    Postgres(PgPool),
    /// In-memory tables or caller-supplied stores; nothing to ping.
    Detached,
}

/// The set of storage collaborators handed to services.
///
/// Cheap to clone; every collaborator is behind an `Arc`.
#[derive(Clone)]
pub struct Storage {
    backend: Backend,
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
}

impl Storage {
    /// Storage backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            catalog: Arc::new(ProductRepository::new(pool.clone())),
            orders: Arc::new(OrderRepository::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    /// Storage over caller-supplied collaborators.
    ///
    /// Used to swap one store for another implementation, such as an order
    /// store that always fails. The result has no pool.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            backend: Backend::Detached,
            users,
            catalog,
            orders,
        }
    }

    /// Storage backed by process memory. Data is lost on restart.
    #[must_use]
    pub fn memory() -> Self {
        Self::from_memory(MemoryStorage::new())
    }

    /// Storage over an existing in-memory database, so a caller can keep a
    /// handle to the same tables.
    #[must_use]
    pub fn from_memory(memory: MemoryStorage) -> Self {
        Self::new(
            Arc::new(memory.clone()),
            Arc::new(memory.clone()),
            Arc::new(memory),
        )
    }

    /// User collaborator.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    /// Product collaborator.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    /// Order collaborator.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.orders.as_ref()
    }

    /// The `PostgreSQL` pool, if this storage is database-backed.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        match &self.backend {
            Backend::Postgres(pool) => Some(pool),
            Backend::Detached => None,
        }
    }

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Backend::Postgres(pool) = &self.backend {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
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

/// Map a unique-violation into `RepositoryError::Conflict`, naming the
/// violated constraint.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or("unique").to_owned();
        return RepositoryError::Conflict(constraint);
    }
    RepositoryError::Database(err)
}

/// Convert a database `INTEGER` count into `u32`.
pub(crate) fn non_negative(value: i32, what: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative {what} in database: {value}")))
}

/// Convert a count into a database `INTEGER`.
pub(crate) fn to_db_count(value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("count out of range: {value}")))
}
