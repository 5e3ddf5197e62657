//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string, only when `STOREFRONT_STORAGE=postgres`
//!
//! ## Optional
//! - `STOREFRONT_STORAGE` - `postgres` or `memory` (default: postgres)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 2000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:2000>);
//!   an `https` URL turns on secure session cookies
//! - `STOREFRONT_SEED_CATALOG` - Seed default products at startup (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where users, products and orders are stored.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// `PostgreSQL`, with sessions in the same database.
    Postgres {
        /// Connection URL (contains password)
        database_url: SecretString,
    },
    /// Process memory. Everything is lost on restart.
    Memory,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storage backend
    pub storage: StorageConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront, validated with `url::Url`
    pub base_url: String,
    /// Insert the default products at startup if the catalog is empty
    pub seed_catalog: bool,
    /// Error tracking
    pub sentry: SentryConfig,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let storage = match env.or_default("STOREFRONT_STORAGE", "postgres").as_str() {
            "postgres" | "postgresql" => StorageConfig::Postgres {
                database_url: env.database_url("STOREFRONT_DATABASE_URL")?,
            },
            "memory" => StorageConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STOREFRONT_STORAGE".to_string(),
                    format!("expected `postgres` or `memory`, got `{other}`"),
                ));
            }
        };

        let host = env.parsed("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parsed("STOREFRONT_PORT", "2000")?;
        let base_url = env.or_default("STOREFRONT_BASE_URL", "http://localhost:2000");
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let seed_catalog = parse_bool(
            "STOREFRONT_SEED_CATALOG",
            &env.or_default("STOREFRONT_SEED_CATALOG", "true"),
        )?;

        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
            sample_rate: env.parsed("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: env.parsed("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        };

        Ok(Self {
            storage,
            host,
            port,
            base_url,
            seed_catalog,
            sentry,
        })
    }

    /// Configuration for tests and local experiments: in-memory storage,
    /// no seeding, no Sentry.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 2000,
            base_url: "http://localhost:2000".to_string(),
            seed_catalog: false,
            sentry: SentryConfig::default(),
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable (or its default) with `FromStr`.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got `{other}`"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STOREFRONT_DATABASE_URL", "postgres://localhost/market")]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:2000");
        assert_eq!(config.base_url, "http://localhost:2000");
        assert!(config.seed_catalog);
        assert!(!config.secure_cookies());
        assert!(config.sentry.dsn.is_none());
        assert!((config.sentry.sample_rate - 1.0).abs() < f32::EPSILON);
        assert!(config.sentry.traces_sample_rate.abs() < f32::EPSILON);
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOREFRONT_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback/db")]).unwrap();
        let StorageConfig::Postgres { database_url } = config.storage else {
            panic!("expected postgres storage");
        };
        assert_eq!(database_url.expose_secret(), "postgres://fallback/db");
    }

    #[test]
    fn test_memory_storage_needs_no_database() {
        let config = load(&[("STOREFRONT_STORAGE", "memory")]).unwrap();
        assert!(matches!(config.storage, StorageConfig::Memory));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("STOREFRONT_STORAGE", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_STORAGE"));

        let err = load(&[("STOREFRONT_STORAGE", "memory"), ("STOREFRONT_PORT", "70000")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));

        let err = load(&[
            ("STOREFRONT_STORAGE", "memory"),
            ("STOREFRONT_SEED_CATALOG", "maybe"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_SEED_CATALOG"));

        let err = load(&[
            ("STOREFRONT_STORAGE", "memory"),
            ("STOREFRONT_BASE_URL", "not a url"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_https_base_url_enables_secure_cookies() {
        let config = load(&[
            ("STOREFRONT_STORAGE", "memory"),
            ("STOREFRONT_BASE_URL", "https://shop.example.com"),
            ("STOREFRONT_SEED_CATALOG", "off"),
        ])
        .unwrap();
        assert!(config.secure_cookies());
        assert!(!config.seed_catalog);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("STOREFRONT_DATABASE_URL", "postgres://user:hunter2@db/market")])
            .unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
