//! # Application State
//!
//! Shared state for the Axum application: the catalog service, the
//! payment gateway, and server configuration. The catalog backend is
//! selected explicitly by configuration, never as a silent runtime
//! fallback.

use cart_baas::HostedCatalog;
use cart_core::{BoxedCatalog, BoxedGateway, FixtureCatalog};
use cart_gateway::{GatewayConfig, HostedGateway};
use std::sync::Arc;

/// Which catalog backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogChoice {
    /// Hosted table API (production)
    Hosted,
    /// Fixture data from `config/products.toml` (offline demo, tests)
    Fixture,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Catalog backend selection
    pub catalog: CatalogChoice,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let catalog = match std::env::var("CATALOG").as_deref() {
            Ok("fixture") => CatalogChoice::Fixture,
            _ => CatalogChoice::Hosted,
        };

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            catalog,
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Catalog service (hosted or fixture, per config)
    pub catalog: BoxedCatalog,
    /// Payment gateway
    pub gateway: BoxedGateway,
    /// Shared secret for notification signature verification
    pub gateway_secret: String,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create the application state from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let catalog: BoxedCatalog = match config.catalog {
            CatalogChoice::Hosted => {
                let hosted = HostedCatalog::from_env()
                    .map_err(|e| anyhow::anyhow!("Failed to initialize catalog client: {}", e))?;
                Arc::new(hosted)
            }
            CatalogChoice::Fixture => Arc::new(load_fixture_catalog()?),
        };

        let gateway_config = GatewayConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize payment gateway: {}", e))?;
        let gateway_secret = gateway_config.shared_secret.clone();
        let gateway: BoxedGateway = Arc::new(HostedGateway::new(gateway_config));

        Ok(Self {
            catalog,
            gateway,
            gateway_secret,
            config,
        })
    }

    /// Create state with explicit collaborators (for testing)
    pub fn with_services(
        catalog: BoxedCatalog,
        gateway: BoxedGateway,
        gateway_secret: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            gateway_secret: gateway_secret.into(),
            config: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
                catalog: CatalogChoice::Fixture,
            },
        }
    }
}

/// Load fixture catalog data from config file
fn load_fixture_catalog() -> anyhow::Result<FixtureCatalog> {
    let config_paths = [
        "config/products.toml",
        "../config/products.toml",
        "../../config/products.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = FixtureCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded fixture catalog from {}", path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No fixture catalog found, using empty catalog");
    Ok(FixtureCatalog::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
        std::env::remove_var("CATALOG");

        let config = AppConfig::from_env();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.catalog, CatalogChoice::Hosted);
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "test".to_string(),
            catalog: CatalogChoice::Fixture,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }
}
