//! Market CLI - Database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema and session table)
//! market-cli migrate
//!
//! # Insert the default products into an empty catalog
//! market-cli seed
//!
//! # Show every product with its stock
//! market-cli products
//!
//! # Add 20 units to product 1
//! market-cli restock 1 20
//!
//! # Change the price of product 2 (existing orders keep their price)
//! market-cli reprice 2 649.00
//! ```
//!
//! All commands read `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "market-cli")]
#[command(author, version, about = "Market storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the default catalog if it is empty
    Seed,
    /// List products with price and stock
    Products,
    /// Add units to a product's stock
    Restock {
        /// Product ID
        id: i32,
        /// Units to add
        units: u32,
    },
    /// Change a product's price
    Reprice {
        /// Product ID
        id: i32,
        /// New price, e.g. 649.00
        price: Decimal,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::catalog::seed().await?,
        Commands::Products => commands::catalog::list().await?,
        Commands::Restock { id, units } => commands::catalog::restock(id, units).await?,
        Commands::Reprice { id, price } => commands::catalog::reprice(id, price).await?,
    }
    Ok(())
}
