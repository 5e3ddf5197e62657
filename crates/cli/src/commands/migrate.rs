//! Database migration command.
//!
//! Applies `crates/storefront/migrations/` (the `market` schema) and creates
//! the `tower_sessions` table used by the session store.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run all storefront migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool)
        .migrate()
        .await
        .map_err(|e| CommandError::SessionStore(e.to_string()))?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
