//! # Storefront Error Types
//!
//! Typed error handling for the codecart storefront engine.
//! All cart and checkout operations return `Result<T, CartError>`.

use thiserror::Error;

/// Core error type for all cart/checkout operations
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bad buyer input; the checkout session stays in `AwaitingInput`
    #[error("Validation error: {0}")]
    Validation(String),

    /// Product not found in the catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Payment provider failure; the session returns to a retryable state
    #[error("Gateway error [{provider}]: {message}")]
    Gateway { provider: String, message: String },

    /// Payment was declined by the provider
    #[error("Payment declined: {reason}")]
    Declined { reason: String },

    /// Order write failed after the payment was captured.
    /// Never retried automatically; surfaced as a support-contact state.
    #[error("Order persistence failed: {0}")]
    Persistence(String),

    /// Client-local cart persistence failing; the cart degrades to
    /// in-memory-only for the session
    #[error("Cart storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Network/HTTP error communicating with a hosted service
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CartError {
    /// Returns true if the user can recover by retrying or correcting input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CartError::Validation(_)
                | CartError::Gateway { .. }
                | CartError::Declined { .. }
                | CartError::Network(_)
                | CartError::StorageUnavailable(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::Configuration(_) => 500,
            CartError::Validation(_) => 400,
            CartError::ProductNotFound { .. } => 404,
            CartError::Gateway { .. } => 502,
            CartError::Declined { .. } => 402,
            CartError::Persistence(_) => 502,
            CartError::StorageUnavailable(_) => 503,
            CartError::Network(_) => 503,
            CartError::Serialization(_) => 500,
            CartError::Internal(_) => 500,
        }
    }
}

/// Result type alias for cart/checkout operations
pub type CartResult<T> = Result<T, CartError>;
