//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - GET  /api/v1/products - List products (category/subcategory filters)
/// - GET  /api/v1/products/{id} - Get product by id
/// - POST /api/v1/checkout - Run a checkout
/// - POST /notifications/{provider} - Gateway payment notification
pub fn create_router(state: AppState) -> Router {
    // The storefront pages are served from a static host, so allow any
    // origin for the browse/checkout API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product))
        .route("/checkout", post(handlers::checkout));

    // Notification routes carry a signature over the raw body; no CORS
    let notification_routes = Router::new()
        .route("/{provider}", post(handlers::payment_notification));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .nest("/notifications", notification_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
