//! # cart-gateway
//!
//! Hosted payment gateway client for codecart.
//!
//! This crate provides:
//!
//! 1. **HostedGateway** - `cart_core::PaymentGateway` over the
//!    provider's payments API: one request per checkout intent, one
//!    terminal outcome (approved/declined/cancelled) back.
//!
//! 2. **notification** - verification of the provider's asynchronous
//!    payment notifications (HMAC-SHA256 signature, timestamp
//!    tolerance) before the reconciler acts on them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart_gateway::HostedGateway;
//! use cart_core::PaymentGateway;
//!
//! // Create gateway from environment (GATEWAY_MERCHANT_ID, GATEWAY_SHARED_SECRET)
//! let gateway = HostedGateway::from_env()?;
//!
//! let outcome = gateway.collect(&intent).await?;
//! ```

pub mod client;
pub mod config;
pub mod notification;

// Re-exports
pub use client::HostedGateway;
pub use config::GatewayConfig;
pub use notification::{sign_payload, verify_notification, PaymentNotification};
