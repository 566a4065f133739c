//! # BaaS Configuration
//!
//! Configuration for the hosted table API. Credentials load from
//! environment variables.

use cart_core::CartError;
use std::env;

/// Hosted table-API configuration
#[derive(Debug, Clone)]
pub struct BaasConfig {
    /// Project base URL (e.g., "https://abc123.backend.example")
    pub base_url: String,

    /// Public API key sent on every request
    pub api_key: String,

    /// REST path prefix for table access
    pub rest_path: String,
}

impl BaasConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `BAAS_URL`
    /// - `BAAS_API_KEY`
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("BAAS_URL")
            .map_err(|_| CartError::Configuration("BAAS_URL not set".to_string()))?;

        let api_key = env::var("BAAS_API_KEY")
            .map_err(|_| CartError::Configuration("BAAS_API_KEY not set".to_string()))?;

        if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
            return Err(CartError::Configuration(
                "BAAS_URL must start with https:// or http://".to_string(),
            ));
        }

        if api_key.trim().is_empty() {
            return Err(CartError::Configuration(
                "BAAS_API_KEY must not be empty".to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            rest_path: "/rest/v1".to_string(),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            rest_path: "/rest/v1".to_string(),
        }
    }

    /// Full URL for a table endpoint
    pub fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, self.rest_path, table)
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}
