//! Catalog product types.

use chrono::{DateTime, Utc};

use market_core::{Price, ProductId, Quantity};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Current unit price. Orders copy this value at purchase time.
    pub price: Price,
    /// Units left. Never negative; only order placement decrements it.
    pub stock: u32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether `quantity` units can currently be sold.
    #[must_use]
    pub const fn has_stock_for(&self, quantity: Quantity) -> bool {
        quantity.get() <= self.stock
    }

    /// Whether the product is sold out.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.stock == 0
    }
}

/// Data needed to insert a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: u32,
}

impl NewProduct {
    /// The products a fresh store opens with.
    #[must_use]
    pub fn default_catalog() -> Vec<Self> {
        vec![
            Self {
                name: "Smartphone".to_owned(),
                description: "The latest smartphone.".to_owned(),
                price: Price::from_units(699),
                stock: 50,
            },
            Self {
                name: "Laptop".to_owned(),
                description: "A high-performance laptop.".to_owned(),
                price: Price::from_units(1299),
                stock: 30,
            },
            Self {
                name: "Headphones".to_owned(),
                description: "Comfortable over-ear headphones.".to_owned(),
                price: Price::from_units(199),
                stock: 100,
            },
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(stock: u32) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Smartphone".to_owned(),
            description: String::new(),
            price: Price::from_units(699),
            stock,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_stock_for_is_inclusive() {
        let p = product(5);
        assert!(p.has_stock_for(Quantity::new(5).unwrap()));
        assert!(!p.has_stock_for(Quantity::new(6).unwrap()));
    }

    #[test]
    fn test_sold_out() {
        assert!(product(0).is_sold_out());
        assert!(!product(1).is_sold_out());
    }

    #[test]
    fn test_default_catalog() {
        let catalog = NewProduct::default_catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].price, Price::from_units(699));
        assert_eq!(catalog[0].stock, 50);
    }
}
