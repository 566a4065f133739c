//! # Payment Gateway Trait
//!
//! Seam for hosted payment providers. A provider receives an immutable
//! checkout intent and resolves to exactly one terminal outcome:
//! approved, declined, or cancelled. Transport failures are errors, not
//! outcomes, and leave the session retryable.

use crate::error::CartResult;
use crate::intent::CheckoutIntent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The single terminal callback ending a payment attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PaymentOutcome {
    /// Payment captured; carries the provider's transaction reference
    Approved { transaction_reference: String },
    /// Provider refused the payment
    Declined { reason: String },
    /// Buyer backed out at the hosted payment page
    Cancelled,
}

impl PaymentOutcome {
    /// Transaction reference, present only on approval
    pub fn transaction_reference(&self) -> Option<&str> {
        match self {
            PaymentOutcome::Approved {
                transaction_reference,
            } => Some(transaction_reference),
            _ => None,
        }
    }
}

/// A hosted payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Run one payment attempt for the intent and return its terminal
    /// outcome. At most one outstanding invocation per intent; the
    /// checkout session enforces this.
    async fn collect(&self, intent: &CheckoutIntent) -> CartResult<PaymentOutcome>;

    /// Provider name (for logging and error attribution)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment gateway (dynamic dispatch)
pub type BoxedGateway = Arc<dyn PaymentGateway>;
