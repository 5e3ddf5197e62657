//! Integration tests for the catalog and order placement.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use market_core::{OrderId, Price, ProductId, UserId};
use market_integration_tests::TestApp;
use market_storefront::db::{CatalogStore, MemoryStorage, OrderStore, RepositoryError, Storage};
use market_storefront::models::{NewOrder, NewProduct, Order};

/// An order store whose database never answers.
struct UnreachableOrders;

#[async_trait]
impl OrderStore for UnreachableOrders {
    async fn place(&self, _order: NewOrder) -> Result<Order, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn get(&self, _id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user_id: UserId,
        _limit: u32,
    ) -> Result<Vec<Order>, RepositoryError> {
        Ok(Vec::new())
    }
}

async fn stock_of(app: &TestApp, id: i32) -> u32 {
    app.storage
        .catalog()
        .get(ProductId::new(id))
        .await
        .unwrap()
        .unwrap()
        .stock
}

#[tokio::test]
async fn test_product_pages() {
    let app = TestApp::spawn().await;
    let client = app.logged_in_browser("alice").await;

    let response = client.get(app.url("/products")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Smartphone"));
    assert!(html.contains("$699.00"));

    let response = client.get(app.url("/products/2")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Laptop"));

    let response = client.get(app.url("/products/999")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_decrements_stock() {
    let app = TestApp::spawn().await;
    let client = app.logged_in_browser("alice").await;
    assert_eq!(stock_of(&app, 1).await, 50);

    let response = app.place_order(&client, 1, "5", "Springfield").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = response.text().await.unwrap();
    assert!(html.contains("Thank you for your order"));
    assert!(html.contains("Smartphone"));
    assert!(html.contains("$3495.00"));
    assert!(html.contains("Springfield"));

    assert_eq!(stock_of(&app, 1).await, 45);
}

#[tokio::test]
async fn test_order_over_stock_rejected() {
    let app = TestApp::spawn().await;
    let client = app.logged_in_browser("alice").await;

    let response = app.place_order(&client, 2, "31", "Springfield").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = response.text().await.unwrap();
    assert!(html.contains("only 30 left in stock"));
    assert!(html.contains(r#"value="Springfield""#));

    assert_eq!(stock_of(&app, 2).await, 30);
}

#[tokio::test]
async fn test_order_beyond_any_stock_level_rejected() {
    let app = TestApp::spawn().await;
    let client = app.logged_in_browser("alice").await;

    for quantity in ["3000000000", "99999999999999999999"] {
        let response = app.place_order(&client, 1, quantity, "Springfield").await;
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "quantity {quantity:?}"
        );
        let html = response.text().await.unwrap();
        assert!(html.contains("only 50 left in stock"), "quantity {quantity:?}");
    }

    assert_eq!(stock_of(&app, 1).await, 50);
}

#[tokio::test]
async fn test_order_storage_failure_shows_reference() {
    let memory = MemoryStorage::new();
    memory
        .insert_if_empty(&NewProduct::default_catalog())
        .await
        .unwrap();
    let storage = Storage::new(
        Arc::new(memory.clone()),
        Arc::new(memory),
        Arc::new(UnreachableOrders),
    );
    let app = TestApp::spawn_with_storage(storage).await;
    let client = app.logged_in_browser("alice").await;

    let token = app.csrf_token(&client, "/order/1").await;
    let response = client
        .post(app.url("/order/1"))
        .header("x-request-id", "outage-7")
        .form(&[
            ("quantity", "2"),
            ("address", "1 Main Street"),
            ("city", "Springfield"),
            ("postal_code", "12345"),
            ("country", "Testland"),
            ("csrf_token", token.as_str()),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = response.text().await.unwrap();
    assert!(html.contains("We could not place your order. Please try again."));
    assert!(html.contains("(reference outage-7)"));
    assert!(html.contains("Smartphone"));
    assert!(html.contains(r#"value="Springfield""#));
    assert!(!html.contains("PoolTimedOut"));

    assert_eq!(stock_of(&app, 1).await, 50);
}

#[tokio::test]
async fn test_invalid_order_input_rejected() {
    let app = TestApp::spawn().await;
    let client = app.logged_in_browser("alice").await;

    for quantity in ["0", "-3", "two", ""] {
        let response = app.place_order(&client, 1, quantity, "Springfield").await;
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "quantity {quantity:?}"
        );
    }

    let response = app.place_order(&client, 1, "1", "").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(stock_of(&app, 1).await, 50);
}

#[tokio::test]
async fn test_order_unknown_product() {
    let app = TestApp::spawn().await;
    let client = app.logged_in_browser("alice").await;

    let response = client.get(app.url("/order/999")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The token is per session, so the one from a real product's form works
    let token = app.csrf_token(&client, "/order/1").await;
    let response = client
        .post(app.url("/order/999"))
        .form(&[
            ("quantity", "1"),
            ("address", "1 Main Street"),
            ("city", "Springfield"),
            ("postal_code", "12345"),
            ("country", "Testland"),
            ("csrf_token", token.as_str()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sold_out_product() {
    let app = TestApp::spawn_with_products(&[NewProduct {
        name: "Limited Print".to_owned(),
        description: "One of a kind.".to_owned(),
        price: Price::from_units(80),
        stock: 1,
    }])
    .await;
    let client = app.logged_in_browser("alice").await;

    let response = app.place_order(&client, 1, "1", "Springfield").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.place_order(&client, 1, "1", "Springfield").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = client
        .get(app.url("/products"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Sold out"));
    assert_eq!(stock_of(&app, 1).await, 0);
}

#[tokio::test]
async fn test_confirmation_is_private() {
    let app = TestApp::spawn().await;
    let alice = app.logged_in_browser("alice").await;
    let bob = app.logged_in_browser("bob").await;

    let response = app.place_order(&alice, 3, "2", "Springfield").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = alice
        .get(app.url("/order-confirmation/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Headphones"));

    let response = bob
        .get(app.url("/order-confirmation/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = alice
        .get(app.url("/order-confirmation/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_lists_recent_orders() {
    let app = TestApp::spawn().await;
    let client = app.logged_in_browser("alice").await;

    let html = client
        .get(app.url("/dashboard"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("You have not placed any orders yet"));

    app.place_order(&client, 1, "1", "Springfield").await;
    app.place_order(&client, 3, "2", "Springfield").await;

    let html = client
        .get(app.url("/dashboard"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("/order-confirmation/1"));
    assert!(html.contains("/order-confirmation/2"));
    assert!(html.contains("$398.00"));
}

#[tokio::test]
async fn test_order_without_csrf_token_forbidden() {
    let app = TestApp::spawn().await;
    let client = app.logged_in_browser("alice").await;

    let response = client
        .post(app.url("/order/1"))
        .form(&[("quantity", "1"), ("city", "Springfield")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(stock_of(&app, 1).await, 50);
}
