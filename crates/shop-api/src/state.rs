//! # Application State
//!
//! Shared state for the Axum application.
//! Everything here is loaded once at startup and read-only afterwards.

use shop_core::{BoxedCatalogStore, InMemoryCatalog};
use shop_token::{OrderTokenAuthenticator, TokenConfig};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Explicit catalog file, if configured
    pub catalog_path: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            catalog_path: std::env::var("CATALOG_PATH").ok().filter(|p| !p.is_empty()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Product catalog
    pub catalog: BoxedCatalogStore,
    /// Order token issuer/verifier
    pub tokens: Arc<OrderTokenAuthenticator>,
    /// Lifetime of issued order tokens, in seconds
    pub token_ttl_secs: i64,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Build the state from the environment.
    ///
    /// Fails when the signing secret is missing or invalid, so the process
    /// never starts serving without one.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let token_config = TokenConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize order tokens: {}", e))?;

        let catalog = load_product_catalog(config.catalog_path.as_deref())?;

        Ok(Self::from_parts(
            config,
            Arc::new(catalog),
            Arc::new(OrderTokenAuthenticator::from_config(&token_config)),
            token_config.ttl_seconds(),
        ))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: AppConfig,
        catalog: BoxedCatalogStore,
        tokens: Arc<OrderTokenAuthenticator>,
        token_ttl_secs: i64,
    ) -> Self {
        Self {
            catalog,
            tokens,
            token_ttl_secs,
            config,
        }
    }
}

/// Load product catalog from config file
fn load_product_catalog(explicit_path: Option<&str>) -> anyhow::Result<InMemoryCatalog> {
    if let Some(path) = explicit_path {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read catalog {}: {}", path, e))?;
        let catalog = InMemoryCatalog::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
        tracing::info!("Loaded {} products from {}", catalog.len(), path);
        return Ok(catalog);
    }

    let config_paths = [
        "config/products.toml",
        "../config/products.toml",
        "../../config/products.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = InMemoryCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} products from {}", catalog.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No product catalog found, using empty catalog");
    Ok(InMemoryCatalog::default())
}
