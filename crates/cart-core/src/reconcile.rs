//! # Order Reconciler
//!
//! Acts on the gateway's terminal callback: a success persists the
//! order record and clears the cart, a decline or cancellation only
//! moves the session so a retry is possible. The one asymmetric case
//! is a persistence failure after capture: funds are gone, so the cart
//! is neither cleared nor restored-and-recharged, and the failure is
//! surfaced as a support-contact state instead of being retried.

use crate::cart::CartStore;
use crate::catalog::BoxedCatalog;
use crate::error::{CartError, CartResult};
use crate::intent::CheckoutIntent;
use crate::order::{OrderRecord, Receipt};
use crate::session::CheckoutSession;
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};

/// Reconciles gateway callbacks against the catalog's `orders`
/// collection and the cart store.
pub struct OrderReconciler {
    catalog: BoxedCatalog,
    /// Receipts for orders already persisted, keyed by order id.
    /// Re-invoking a success for a recorded order returns the original
    /// receipt instead of inserting a duplicate.
    recorded: HashMap<String, Receipt>,
}

impl OrderReconciler {
    pub fn new(catalog: BoxedCatalog) -> Self {
        Self {
            catalog,
            recorded: HashMap::new(),
        }
    }

    /// Handle a gateway success callback.
    ///
    /// Persists an `OrderRecord` built from the intent, then clears
    /// the cart and returns the receipt. On a persistence failure the
    /// cart is left exactly as it was (the payment is already
    /// captured) and `CartError::Persistence` is returned; the write
    /// is never retried here because a retry after an unknown
    /// partial-write state could duplicate the order.
    #[instrument(skip(self, intent, cart), fields(order_id = %intent.order_id))]
    pub async fn on_success(
        &mut self,
        intent: &CheckoutIntent,
        transaction_reference: &str,
        cart: &mut CartStore,
    ) -> CartResult<Receipt> {
        if let Some(receipt) = self.recorded.get(&intent.order_id) {
            warn!("duplicate success callback for recorded order, returning original receipt");
            return Ok(receipt.clone());
        }

        let record = OrderRecord::from_intent(intent, transaction_reference);
        if let Err(e) = self.catalog.insert_order(&record).await {
            error!("order record write failed after payment capture: {e}");
            return Err(CartError::Persistence(format!(
                "payment succeeded but the order record could not be saved \
                 (reference {transaction_reference}); contact support"
            )));
        }

        let receipt = Receipt::from_record(&record);
        self.recorded
            .insert(record.order_id.clone(), receipt.clone());
        cart.clear();
        info!(reference = %transaction_reference, total = %record.total.display(), "order recorded");
        Ok(receipt)
    }

    /// Handle a gateway error callback: leave the cart untouched and
    /// settle the session into its retryable failed state.
    pub fn on_error(&self, session: &mut CheckoutSession, reason: &str) -> CartResult<()> {
        session.settle(&crate::gateway::PaymentOutcome::Declined {
            reason: reason.to_string(),
        })?;
        Ok(())
    }

    /// Handle a gateway cancellation callback: cart preserved untouched
    pub fn on_cancel(&self, session: &mut CheckoutSession) -> CartResult<()> {
        session.settle(&crate::gateway::PaymentOutcome::Cancelled)?;
        Ok(())
    }
}
