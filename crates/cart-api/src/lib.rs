//! # cart-api
//!
//! HTTP API layer for codecart.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for product browsing and checkout
//! - Signed-notification intake for payment events
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/products` | List products (filterable) |
//! | GET | `/api/v1/products/{product_id}` | Get product |
//! | POST | `/api/v1/checkout` | Run a checkout |
//! | POST | `/notifications/{provider}` | Payment notification |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, CatalogChoice};
