//! Product catalog reads and seeding.

use tracing::{info, instrument};

use market_core::ProductId;

use crate::db::{CatalogStore, RepositoryError};
use crate::models::{NewProduct, Product};

/// Read access to the product catalog.
pub struct CatalogService<'a> {
    products: &'a dyn CatalogStore,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(products: &'a dyn CatalogStore) -> Self {
        Self { products }
    }

    /// All products, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if storage fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.products.list().await
    }

    /// One product, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if storage fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.products.get(id).await
    }

    /// Insert the default products if the catalog is empty.
    ///
    /// Returns how many products were inserted (zero when the catalog
    /// already had products).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if storage fails.
    #[instrument(skip(self))]
    pub async fn seed_default_catalog(&self) -> Result<usize, RepositoryError> {
        let inserted = self
            .products
            .insert_if_empty(&NewProduct::default_catalog())
            .await?;

        if inserted == 0 {
            info!("Catalog already populated, skipping seed");
        } else {
            info!(inserted, "Seeded default catalog");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let storage = MemoryStorage::new();
        let catalog = CatalogService::new(&storage);

        assert_eq!(catalog.seed_default_catalog().await.unwrap(), 3);
        assert_eq!(catalog.seed_default_catalog().await.unwrap(), 0);

        let products = catalog.list_products().await.unwrap();
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Smartphone", "Laptop", "Headphones"]);
    }

    #[tokio::test]
    async fn test_get_product() {
        let storage = MemoryStorage::new();
        let catalog = CatalogService::new(&storage);
        catalog.seed_default_catalog().await.unwrap();

        let laptop = catalog.get_product(ProductId::new(2)).await.unwrap().unwrap();
        assert_eq!(laptop.stock, 30);
        assert!(catalog.get_product(ProductId::new(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_skips_non_empty_catalog() {
        let storage = MemoryStorage::new();
        storage
            .insert_product(NewProduct::default_catalog().remove(2))
            .await
            .unwrap();

        let catalog = CatalogService::new(&storage);
        assert_eq!(catalog.seed_default_catalog().await.unwrap(), 0);
        assert_eq!(catalog.list_products().await.unwrap()[0].name, "Headphones");
    }
}
