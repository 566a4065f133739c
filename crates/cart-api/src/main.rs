//! # Codecart
//!
//! Storefront cart/checkout engine.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export BAAS_URL=https://abc123.backend.example
//! export BAAS_API_KEY=...
//! export GATEWAY_MERCHANT_ID=255781290131
//! export GATEWAY_SHARED_SECRET=...
//!
//! # Run the server
//! codecart
//! ```

use cart_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Catalog backend: {:?}", state.config.catalog);
    info!("Payment provider: {}", state.gateway.provider_name());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Codecart starting on http://{}", addr);

    if !is_prod {
        info!("Products: GET http://{}/api/v1/products", addr);
        info!("Checkout: POST http://{}/api/v1/checkout", addr);
        info!("Notifications: POST http://{}/notifications/verifone", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
