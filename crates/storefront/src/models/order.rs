//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use market_core::{OrderId, Price, ProductId, Quantity, ShippingInfo, UserId};

/// One product line of an order.
///
/// `name` and `price` are copied from the product when the order is placed,
/// so later catalog edits never change a historical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: Quantity,
}

impl LineItem {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// A placed order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<LineItem>,
    pub shipping: ShippingInfo,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of all line subtotals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }
}

/// A validated request to buy `quantity` units of one product.
///
/// Storage backends turn this into an [`Order`] atomically: the stock check,
/// the stock decrement and the order insert succeed or fail together.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub shipping: ShippingInfo,
}
