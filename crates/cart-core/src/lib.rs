//! # cart-core
//!
//! Core types and logic for the codecart storefront engine.
//!
//! This crate provides:
//! - `CartStore` and `CartStorage` for the client-local cart slot
//! - `pricing` for exact minor-unit totals
//! - `CheckoutSession` for the checkout state machine
//! - `OrderReconciler` for acting on gateway callbacks
//! - `CatalogService` and `PaymentGateway` traits for the hosted collaborators
//! - `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cart_core::{Buyer, CartStore, CheckoutSession, LineItem, OrderReconciler};
//!
//! let mut cart = CartStore::in_memory();
//! cart.add(LineItem::from_product(&product, 1));
//!
//! let mut session = CheckoutSession::new();
//! session.begin(&cart.snapshot())?;
//! let intent = session.submit(Buyer::new("Ana", "ana@example.com"), &cart.snapshot())?;
//!
//! let outcome = gateway.collect(intent).await?;
//! session.settle(&outcome)?;
//!
//! if let Some(reference) = outcome.transaction_reference() {
//!     let receipt = reconciler.on_success(intent, reference, &mut cart).await?;
//! }
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod intent;
pub mod money;
pub mod order;
pub mod pricing;
pub mod reconcile;
pub mod session;

// Re-exports for convenience
pub use cart::{Cart, CartStorage, CartStore, LineItem, MemorySlot};
pub use catalog::{
    BoxedCatalog, CatalogService, FixtureCatalog, Product, ProductFilter, ProductStatus,
};
pub use error::{CartError, CartResult};
pub use gateway::{BoxedGateway, PaymentGateway, PaymentOutcome};
pub use intent::{Buyer, CheckoutIntent};
pub use money::{Currency, Price};
pub use order::{DownloadRef, OrderRecord, PaymentStatus, Receipt};
pub use reconcile::OrderReconciler;
pub use session::{CheckoutSession, SessionState};
