//! Order placement against `PostgreSQL`.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `STOREFRONT_DATABASE_URL` pointing at it (a `.env` file works too)
//!
//! Migrations are applied on connect. Every test makes its own user and
//! product, so runs do not interfere with each other or with existing data.
//!
//! Run with: cargo test -p market-integration-tests -- --include-ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use secrecy::SecretString;
use uuid::Uuid;

use market_core::{Email, Price, ProductId, Quantity, ShippingInfo, UserId, Username};
use market_storefront::db::{RepositoryError, Storage, create_pool};
use market_storefront::models::{NewOrder, NewUser};
use market_storefront::services::{OrderError, OrderRequest, OrderService};

async fn storage() -> Storage {
    let _ = dotenvy::dotenv();
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .expect("STOREFRONT_DATABASE_URL must be set for PostgreSQL tests");
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to PostgreSQL");
    sqlx::migrate!("../storefront/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Storage::postgres(pool)
}

async fn new_user(storage: &Storage) -> UserId {
    let tag = Uuid::new_v4().simple().to_string();
    storage
        .users()
        .create(NewUser {
            username: Username::parse(&format!("pg-{tag}")).unwrap(),
            email: Email::parse(&format!("{tag}@example.com")).unwrap(),
            password_hash: "unused".to_owned(),
        })
        .await
        .unwrap()
        .id
}

async fn new_product(storage: &Storage, stock: i32) -> ProductId {
    let (id,): (ProductId,) = sqlx::query_as(
        r"
        INSERT INTO market.products (name, description, price, stock)
        VALUES ($1, '', $2, $3)
        RETURNING id
        ",
    )
    .bind(format!("Test item {}", Uuid::new_v4()))
    .bind(Price::from_cents(69_999))
    .bind(stock)
    .fetch_one(storage.pool().unwrap())
    .await
    .unwrap();
    id
}

async fn stock_of(storage: &Storage, id: ProductId) -> u32 {
    storage.catalog().get(id).await.unwrap().unwrap().stock
}

async fn order_rows_for(storage: &Storage, id: ProductId) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM market.order_items WHERE product_id = $1")
            .bind(id)
            .fetch_one(storage.pool().unwrap())
            .await
            .unwrap();
    count
}

fn request(quantity: &str) -> OrderRequest {
    OrderRequest {
        quantity: quantity.to_owned(),
        address: "1 Main Street".to_owned(),
        city: "Springfield".to_owned(),
        postal_code: "12345".to_owned(),
        country: "Testland".to_owned(),
    }
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_order_decrements_stock_and_keeps_snapshot() {
    let storage = storage().await;
    let user = new_user(&storage).await;
    let product = new_product(&storage, 50).await;

    let order = OrderService::new(&storage)
        .place_order(product, &request("5"), user)
        .await
        .unwrap();
    assert_eq!(stock_of(&storage, product).await, 45);
    assert_eq!(order.items[0].quantity.get(), 5);
    assert_eq!(order.items[0].price, Price::from_cents(69_999));

    storage
        .catalog()
        .set_price(product, Price::from_units(1))
        .await
        .unwrap();

    let stored = storage.orders().get(order.id).await.unwrap().unwrap();
    assert_eq!(stored.user_id, user);
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.items[0].product_id, product);
    assert_eq!(stored.items[0].name, order.items[0].name);
    assert_eq!(stored.items[0].price, Price::from_cents(69_999));
    assert_eq!(stored.shipping.city(), "Springfield");
    assert_eq!(order_rows_for(&storage, product).await, 1);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_order_over_stock_writes_nothing() {
    let storage = storage().await;
    let user = new_user(&storage).await;
    let product = new_product(&storage, 3).await;

    let err = OrderService::new(&storage)
        .place_order(product, &request("4"), user)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::InsufficientStock {
            requested: 4,
            available: 3,
            ..
        }
    ));

    // The service checks stock first; go straight to the store as well
    let err = storage
        .orders()
        .place(NewOrder {
            user_id: user,
            product_id: product,
            quantity: Quantity::new(4).unwrap(),
            shipping: ShippingInfo::parse("1 Main Street", "Springfield", "12345", "Testland")
                .unwrap(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::InsufficientStock {
            requested: 4,
            available: 3
        }
    ));

    assert_eq!(stock_of(&storage, product).await, 3);
    assert_eq!(order_rows_for(&storage, product).await, 0);
    assert!(
        storage
            .orders()
            .list_for_user(user, 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_order_for_missing_product_rolls_back() {
    let storage = storage().await;
    let user = new_user(&storage).await;

    let err = storage
        .orders()
        .place(NewOrder {
            user_id: user,
            product_id: ProductId::new(i32::MAX),
            quantity: Quantity::new(1).unwrap(),
            shipping: ShippingInfo::parse("1 Main Street", "Springfield", "12345", "Testland")
                .unwrap(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
    assert!(
        storage
            .orders()
            .list_for_user(user, 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_concurrent_orders_never_oversell() {
    let storage = Arc::new(storage().await);
    let user = new_user(&storage).await;
    let product = new_product(&storage, 10).await;

    let mut handles = Vec::new();
    for _ in 0..25 {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            OrderService::new(&storage)
                .place_order(product, &request("1"), user)
                .await
        }));
    }

    let mut placed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(OrderError::InsufficientStock { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(placed, 10);
    assert_eq!(rejected, 15);
    assert_eq!(stock_of(&storage, product).await, 0);
    assert_eq!(order_rows_for(&storage, product).await, 10);
}
