//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};

use market_core::ProductId;

use crate::error::AppError;
use crate::filters;
use crate::models::Product;
use crate::services::CatalogService;
use crate::state::AppState;

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<Product>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: Product,
}

/// Display the product listing page.
///
/// # Errors
///
/// Returns `AppError::Database` if the catalog cannot be read.
#[tracing::instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<ProductsIndexTemplate, AppError> {
    let products = CatalogService::new(state.storage().catalog())
        .list_products()
        .await?;

    Ok(ProductsIndexTemplate { products })
}

/// Display a product detail page.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product does not exist.
#[tracing::instrument(skip(state), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<ProductShowTemplate, AppError> {
    let product = CatalogService::new(state.storage().catalog())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate { product })
}
