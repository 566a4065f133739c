//! # Checkout Session
//!
//! State machine driving one checkout: collect buyer input, hand an
//! immutable intent to the payment gateway, and settle on the gateway's
//! single terminal callback.
//!
//! ```text
//! Idle ──begin──▶ AwaitingInput ──submit──▶ AwaitingGateway
//!                      ▲                          │ settle
//!                      │ resubmit      ┌──────────┼──────────┐
//!                      └── Failed ◀────┘      Succeeded   Cancelled
//! ```

use crate::cart::Cart;
use crate::error::{CartError, CartResult};
use crate::gateway::PaymentOutcome;
use crate::intent::{Buyer, CheckoutIntent};
use tracing::{debug, info};

/// Session states. `Succeeded`, `Failed`, and `Cancelled` are terminal
/// for the current intent; `Failed` additionally allows a retry without
/// re-entering buyer data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingInput,
    AwaitingGateway,
    Succeeded,
    Failed,
    Cancelled,
}

impl SessionState {
    /// True once the current intent has reached a terminal callback
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Succeeded | SessionState::Failed | SessionState::Cancelled
        )
    }
}

/// One checkout attempt over a cart snapshot
#[derive(Debug, Default)]
pub struct CheckoutSession {
    state: SessionState,
    buyer: Option<Buyer>,
    intent: Option<CheckoutIntent>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

impl CheckoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The intent handed to the gateway, if one has been built
    pub fn intent(&self) -> Option<&CheckoutIntent> {
        self.intent.as_ref()
    }

    /// Whether the submit affordance should be enabled. Disabled for
    /// the whole of `AwaitingGateway` to rule out a double charge from
    /// two near-simultaneous submissions.
    pub fn can_submit(&self) -> bool {
        matches!(self.state, SessionState::AwaitingInput | SessionState::Failed)
    }

    /// Enter checkout. The guard routes an empty cart away entirely:
    /// no state change, no intent.
    pub fn begin(&mut self, cart: &Cart) -> CartResult<()> {
        if self.state == SessionState::AwaitingGateway {
            return Err(CartError::Internal(
                "cannot re-enter checkout while a payment is in flight".into(),
            ));
        }
        if cart.is_empty() {
            return Err(CartError::Validation(
                "cannot check out an empty cart".into(),
            ));
        }
        self.state = SessionState::AwaitingInput;
        self.intent = None;
        Ok(())
    }

    /// Submit buyer details and build the intent for the gateway.
    ///
    /// Validation failure keeps the session in `AwaitingInput` and no
    /// intent is created. Legal from `Failed` as the retry path.
    pub fn submit(&mut self, buyer: Buyer, cart: &Cart) -> CartResult<&CheckoutIntent> {
        if !self.can_submit() {
            return Err(CartError::Internal(format!(
                "submit not allowed in state {:?}",
                self.state
            )));
        }

        let intent = CheckoutIntent::new(buyer.clone(), cart)?;
        debug!(order_id = %intent.order_id, total = %intent.total.display(), "intent created");

        self.buyer = Some(buyer);
        self.state = SessionState::AwaitingGateway;
        Ok(self.intent.insert(intent))
    }

    /// Retry after a failed payment, reusing the retained buyer data
    pub fn resubmit(&mut self, cart: &Cart) -> CartResult<&CheckoutIntent> {
        if self.state != SessionState::Failed {
            return Err(CartError::Internal(format!(
                "resubmit only allowed after a failed payment, state is {:?}",
                self.state
            )));
        }
        let buyer = self
            .buyer
            .clone()
            .ok_or_else(|| CartError::Internal("no retained buyer to resubmit".into()))?;
        self.submit(buyer, cart)
    }

    /// Apply the gateway's terminal callback. Exactly one settlement
    /// per intent: any state other than `AwaitingGateway` rejects.
    pub fn settle(&mut self, outcome: &PaymentOutcome) -> CartResult<SessionState> {
        if self.state != SessionState::AwaitingGateway {
            return Err(CartError::Internal(format!(
                "no payment in flight to settle, state is {:?}",
                self.state
            )));
        }

        self.state = match outcome {
            PaymentOutcome::Approved { transaction_reference } => {
                info!(reference = %transaction_reference, "payment approved");
                SessionState::Succeeded
            }
            PaymentOutcome::Declined { reason } => {
                info!(%reason, "payment declined");
                SessionState::Failed
            }
            PaymentOutcome::Cancelled => {
                info!("payment cancelled by buyer");
                SessionState::Cancelled
            }
        };
        Ok(self.state)
    }
}
