//! # cart-baas
//!
//! Hosted table-API catalog client for codecart.
//!
//! Implements `cart_core::CatalogService` over a record-oriented REST
//! surface: a `products` collection filterable by category, subcategory
//! and status, and an `orders` collection the reconciler inserts into.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart_baas::HostedCatalog;
//! use cart_core::ProductFilter;
//!
//! // Create client from environment (BAAS_URL, BAAS_API_KEY)
//! let catalog = HostedCatalog::from_env()?;
//!
//! let filter = ProductFilter::active().with_main_category("python");
//! let products = catalog.products(&filter).await?;
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::HostedCatalog;
pub use config::BaasConfig;
