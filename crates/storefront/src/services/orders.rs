//! Order placement.
//!
//! [`OrderService::place_order`] turns a raw order form into a persisted
//! [`Order`]. It validates the input against the current product, then hands
//! a [`NewOrder`] to the storage layer, whose `place` performs the stock
//! decrement and the order insert atomically. A stock check that passes here
//! can still lose a race to a concurrent order; the storage layer reports
//! that as `InsufficientStock` too, and nothing is written.

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use market_core::{OrderId, ProductId, Quantity, QuantityError, ShippingInfo, UserId};

use crate::db::{RepositoryError, Storage};
use crate::models::{NewOrder, Order, Product};

/// How many orders the dashboard shows.
pub const RECENT_ORDER_LIMIT: u32 = 5;

/// Raw order form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// Why an order could not be placed.
///
/// `Validation` and `InsufficientStock` carry the product as it is now so the
/// form can be shown again.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The product does not exist.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// A form field is missing or malformed.
    #[error("{message}")]
    Validation {
        product: Box<Product>,
        message: String,
    },

    /// More units were requested than are in stock.
    ///
    /// `requested` is wider than a [`Quantity`] because a count too large to
    /// order at all lands here too.
    #[error("only {available} left in stock (requested {requested})")]
    InsufficientStock {
        product: Box<Product>,
        requested: u64,
        available: u32,
    },

    /// The storage layer failed.
    #[error("could not save order: {0}")]
    Persistence(#[from] RepositoryError),
}

impl OrderError {
    /// The product to re-render the form for, if the form can be shown again.
    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        match self {
            Self::Validation { product, .. } | Self::InsufficientStock { product, .. } => {
                Some(product)
            }
            Self::NotFound(_) | Self::Persistence(_) => None,
        }
    }

    /// Split an error the user can fix into the product and the message to
    /// show with the form. Other errors are handed back unchanged.
    ///
    /// # Errors
    ///
    /// Returns `self` for `NotFound` and `Persistence`.
    pub fn into_reprompt(self) -> Result<(Product, String), Self> {
        let message = self.to_string();
        match self {
            Self::Validation { product, .. } | Self::InsufficientStock { product, .. } => {
                Ok((*product, message))
            }
            other => Err(other),
        }
    }
}

/// Order placement and lookup.
pub struct OrderService<'a> {
    storage: &'a Storage,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Place an order for `request.quantity` units of `product_id`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the product does not exist.
    /// Returns `OrderError::Validation` for a blank, non-numeric or
    /// non-positive quantity or a missing shipping field.
    /// Returns `OrderError::InsufficientStock` if fewer units are left than
    /// requested, including counts beyond [`Quantity::MAX`].
    /// Returns `OrderError::Persistence` if storage fails.
    #[instrument(skip(self, request), fields(product_id = %product_id, user_id = %user_id))]
    pub async fn place_order(
        &self,
        product_id: ProductId,
        request: &OrderRequest,
        user_id: UserId,
    ) -> Result<Order, OrderError> {
        let product = self
            .storage
            .catalog()
            .get(product_id)
            .await?
            .ok_or(OrderError::NotFound(product_id))?;

        let (quantity, shipping) = match validate(request) {
            Ok(valid) => valid,
            Err(Invalid::Oversized(requested)) => {
                warn!(requested, available = product.stock, "Insufficient stock");
                return Err(OrderError::InsufficientStock {
                    requested,
                    available: product.stock,
                    product: Box::new(product),
                });
            }
            Err(Invalid::Field(message)) => {
                warn!(%message, "Order rejected");
                return Err(OrderError::Validation {
                    product: Box::new(product),
                    message,
                });
            }
        };

        if !product.has_stock_for(quantity) {
            warn!(requested = %quantity, available = product.stock, "Insufficient stock");
            return Err(OrderError::InsufficientStock {
                requested: u64::from(quantity.get()),
                available: product.stock,
                product: Box::new(product),
            });
        }

        let placed = self
            .storage
            .orders()
            .place(NewOrder {
                user_id,
                product_id,
                quantity,
                shipping,
            })
            .await;

        match placed {
            Ok(order) => {
                info!(order_id = %order.id, quantity = %quantity, total = %order.total(), "Order placed");
                Ok(order)
            }
            Err(RepositoryError::InsufficientStock {
                requested,
                available,
            }) => {
                warn!(requested, available, "Lost stock race to a concurrent order");
                let mut product = product;
                product.stock = available;
                Err(OrderError::InsufficientStock {
                    product: Box::new(product),
                    requested: u64::from(requested),
                    available,
                })
            }
            Err(RepositoryError::NotFound) => Err(OrderError::NotFound(product_id)),
            Err(e) => Err(OrderError::Persistence(e)),
        }
    }

    /// One order, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if storage fails.
    pub async fn get_order_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = self.storage.orders().get(order_id).await?;
        Ok(order.filter(|order| order.user_id == user_id))
    }

    /// A user's most recent orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if storage fails.
    pub async fn recent_orders(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        self.storage
            .orders()
            .list_for_user(user_id, RECENT_ORDER_LIMIT)
            .await
    }
}

/// Why the form itself was rejected.
enum Invalid {
    /// A field the user must correct.
    Field(String),
    /// A well-formed count larger than any stock level.
    Oversized(u64),
}

/// Parse the form, reporting shipping problems before quantity problems.
fn validate(request: &OrderRequest) -> Result<(Quantity, ShippingInfo), Invalid> {
    let shipping = ShippingInfo::parse(
        &request.address,
        &request.city,
        &request.postal_code,
        &request.country,
    )
    .map_err(|e| Invalid::Field(e.to_string()))?;

    let quantity = Quantity::parse(&request.quantity).map_err(|e| match e {
        QuantityError::TooLarge { requested, .. } => Invalid::Oversized(requested),
        other => Invalid::Field(other.to_string()),
    })?;

    Ok((quantity, shipping))
}
