//! Catalog management commands.

use rust_decimal::Decimal;

use market_core::{Price, ProductId, Quantity};
use market_storefront::db::{RepositoryError, Storage};
use market_storefront::services::CatalogService;

use super::{CommandError, connect};

async fn storage() -> Result<Storage, CommandError> {
    Ok(Storage::postgres(connect().await?))
}

/// Insert the default products if the catalog is empty.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the insert fails.
pub async fn seed() -> Result<(), CommandError> {
    let storage = storage().await?;
    let inserted = CatalogService::new(storage.catalog())
        .seed_default_catalog()
        .await?;

    if inserted == 0 {
        tracing::info!("Catalog already has products, nothing seeded");
    } else {
        tracing::info!(inserted, "Seeded default catalog");
    }
    Ok(())
}

/// Log every product with its price and stock.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), CommandError> {
    let storage = storage().await?;
    let products = CatalogService::new(storage.catalog())
        .list_products()
        .await?;

    if products.is_empty() {
        tracing::info!("Catalog is empty");
    }
    for product in products {
        tracing::info!(
            id = %product.id,
            price = %product.price,
            stock = product.stock,
            "{}",
            product.name
        );
    }
    Ok(())
}

/// Add units to a product's stock.
///
/// # Errors
///
/// Returns an error if `units` is zero, the product does not exist, or the
/// update fails.
pub async fn restock(id: i32, units: u32) -> Result<(), CommandError> {
    let units = Quantity::new(units)?;
    let storage = storage().await?;

    let product = storage
        .catalog()
        .restock(ProductId::new(id), units)
        .await
        .map_err(|e| unknown_product(e, id))?;

    tracing::info!(id, stock = product.stock, "Restocked {}", product.name);
    Ok(())
}

/// Change a product's price.
///
/// # Errors
///
/// Returns an error if the price is invalid, the product does not exist, or
/// the update fails.
pub async fn reprice(id: i32, price: Decimal) -> Result<(), CommandError> {
    let price = Price::new(price)?;
    let storage = storage().await?;

    let product = storage
        .catalog()
        .set_price(ProductId::new(id), price)
        .await
        .map_err(|e| unknown_product(e, id))?;

    tracing::info!(id, price = %product.price, "Repriced {}", product.name);
    Ok(())
}

fn unknown_product(err: RepositoryError, id: i32) -> CommandError {
    match err {
        RepositoryError::NotFound => CommandError::UnknownProduct(id),
        other => CommandError::Repository(other),
    }
}
