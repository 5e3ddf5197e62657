//! CLI subcommands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

pub mod catalog;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use market_core::{PriceError, QuantityError};
use market_storefront::db::{self, RepositoryError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session table migration error.
    #[error("Session store migration error: {0}")]
    SessionStore(String),

    /// Repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The product ID does not exist.
    #[error("No product with ID {0}")]
    UnknownProduct(i32),

    /// Invalid unit count.
    #[error("Invalid units: {0}")]
    InvalidUnits(#[from] QuantityError),

    /// Invalid price.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),
}

/// Connect to the storefront database named by the environment.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url).await?)
}
