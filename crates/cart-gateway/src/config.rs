//! # Gateway Configuration
//!
//! Configuration for the hosted payment gateway. All secrets load from
//! environment variables.

use cart_core::CartError;
use std::env;

/// Hosted payment gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Merchant account identifier (digits)
    pub merchant_id: String,

    /// Shared secret used to sign payment notifications
    pub shared_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `GATEWAY_MERCHANT_ID`
    /// - `GATEWAY_SHARED_SECRET`
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let merchant_id = env::var("GATEWAY_MERCHANT_ID")
            .map_err(|_| CartError::Configuration("GATEWAY_MERCHANT_ID not set".to_string()))?;

        let shared_secret = env::var("GATEWAY_SHARED_SECRET")
            .map_err(|_| CartError::Configuration("GATEWAY_SHARED_SECRET not set".to_string()))?;

        if merchant_id.is_empty() || !merchant_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CartError::Configuration(
                "GATEWAY_MERCHANT_ID must be a numeric merchant account id".to_string(),
            ));
        }

        if shared_secret.len() < 16 {
            return Err(CartError::Configuration(
                "GATEWAY_SHARED_SECRET must be at least 16 characters".to_string(),
            ));
        }

        let api_base_url = env::var("GATEWAY_URL")
            .unwrap_or_else(|_| "https://checkout.gateway.example".to_string());

        Ok(Self {
            merchant_id,
            shared_secret,
            api_base_url,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        merchant_id: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            shared_secret: shared_secret.into(),
            api_base_url: "https://checkout.gateway.example".to_string(),
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
