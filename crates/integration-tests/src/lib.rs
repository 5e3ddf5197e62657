//! Integration test harness for the market storefront.
//!
//! Each test spawns the real router on an ephemeral port, backed by in-memory
//! storage and an in-memory session store, and talks to it over HTTP with a
//! cookie-keeping `reqwest` client. No database is needed, except for the
//! `#[ignore]`d tests in `tests/postgres_orders.rs`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p market-integration-tests
//!
//! # Also run the PostgreSQL tests
//! STOREFRONT_DATABASE_URL=postgres://localhost/market_test \
//!     cargo test -p market-integration-tests -- --include-ignored
//! ```

use reqwest::{Client, Response, redirect::Policy};
use tower_sessions::MemoryStore;

use market_storefront::app::build_router;
use market_storefront::config::StorefrontConfig;
use market_storefront::db::{MemoryStorage, Storage};
use market_storefront::models::NewProduct;
use market_storefront::services::CatalogService;
use market_storefront::state::AppState;

/// A running storefront plus a handle to its storage.
pub struct TestApp {
    pub base_url: String,
    pub storage: Storage,
}

impl TestApp {
    /// Start a storefront with the default catalog.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn spawn() -> Self {
        let app = Self::spawn_with_products(&[]).await;
        CatalogService::new(app.storage.catalog())
            .seed_default_catalog()
            .await
            .expect("Failed to seed catalog");
        app
    }

    /// Start a storefront whose catalog holds exactly `products`.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn spawn_with_products(products: &[NewProduct]) -> Self {
        let memory = MemoryStorage::new();
        for product in products {
            memory
                .insert_product(product.clone())
                .await
                .expect("Failed to insert product");
        }

        Self::spawn_with_storage(Storage::from_memory(memory)).await
    }

    /// Start a storefront over the given storage collaborators.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn spawn_with_storage(storage: Storage) -> Self {
        let state = AppState::new(StorefrontConfig::in_memory(), storage.clone());
        let router = build_router(state, MemoryStore::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            storage,
        }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh browser: its own cookie jar, redirects not followed.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn browser() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Load a form page and return the CSRF token embedded in it.
    ///
    /// # Panics
    ///
    /// Panics if the page has no token.
    pub async fn csrf_token(&self, client: &Client, path: &str) -> String {
        let html = client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to load form")
            .text()
            .await
            .expect("Failed to read form body");
        extract_csrf_token(&html).expect("Form has no CSRF token")
    }

    /// Submit the sign-up form.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn sign_up(
        &self,
        client: &Client,
        username: &str,
        email: &str,
        password: &str,
    ) -> Response {
        let token = self.csrf_token(client, "/signup").await;
        client
            .post(self.url("/signup"))
            .form(&[
                ("username", username),
                ("email", email),
                ("password", password),
                ("confirm_password", password),
                ("csrf_token", token.as_str()),
            ])
            .send()
            .await
            .expect("Failed to submit sign-up")
    }

    /// Submit the login form.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn log_in(&self, client: &Client, email: &str, password: &str) -> Response {
        let token = self.csrf_token(client, "/login").await;
        client
            .post(self.url("/login"))
            .form(&[
                ("email", email),
                ("password", password),
                ("csrf_token", token.as_str()),
            ])
            .send()
            .await
            .expect("Failed to submit login")
    }

    /// A browser that has signed up as `username` and is logged in.
    ///
    /// # Panics
    ///
    /// Panics if sign-up does not redirect.
    pub async fn logged_in_browser(&self, username: &str) -> Client {
        let client = Self::browser();
        let response = self
            .sign_up(&client, username, &format!("{username}@example.com"), "secret123")
            .await;
        assert!(
            response.status().is_redirection(),
            "sign-up for {username} failed with {}",
            response.status()
        );
        client
    }

    /// Submit the order form for a product.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn place_order(
        &self,
        client: &Client,
        product_id: i32,
        quantity: &str,
        city: &str,
    ) -> Response {
        let path = format!("/order/{product_id}");
        let token = self.csrf_token(client, &path).await;
        client
            .post(self.url(&path))
            .form(&[
                ("quantity", quantity),
                ("address", "1 Main Street"),
                ("city", city),
                ("postal_code", "12345"),
                ("country", "Testland"),
                ("csrf_token", token.as_str()),
            ])
            .send()
            .await
            .expect("Failed to submit order")
    }
}

/// Pull the value of the hidden `csrf_token` input out of a page.
#[must_use]
pub fn extract_csrf_token(html: &str) -> Option<String> {
    const MARKER: &str = r#"name="csrf_token" value=""#;
    let start = html.find(MARKER)? + MARKER.len();
    let rest = html.get(start..)?;
    let end = rest.find('"')?;
    rest.get(..end).map(str::to_owned)
}
