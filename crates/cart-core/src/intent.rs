//! # Checkout Intent
//!
//! The immutable snapshot handed to the payment gateway: buyer
//! identity, the cart's line items at intent-creation time, and the
//! derived total. Once constructed it never changes; a retry builds a
//! new intent with a new order id.

use crate::cart::{Cart, LineItem};
use crate::error::{CartError, CartResult};
use crate::money::Price;
use crate::pricing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Buyer identity collected on the checkout form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Buyer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    /// Builder: set phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Validate the buyer fields: non-empty name, email of shape
    /// `local@domain.tld`. Shape check only, no deeper validation.
    pub fn validate(&self) -> CartResult<()> {
        if self.name.trim().is_empty() {
            return Err(CartError::Validation("buyer name is required".into()));
        }
        if !is_email_shaped(&self.email) {
            return Err(CartError::Validation(format!(
                "invalid email address: {}",
                self.email
            )));
        }
        Ok(())
    }
}

/// `local@domain.tld`: non-empty local part, one `@`, domain with a
/// dot separating non-empty labels.
fn is_email_shaped(email: &str) -> bool {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    if local.is_empty() || local.contains(char::is_whitespace) {
        return false;
    }
    !domain.is_empty()
        && !domain.contains(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Immutable order intent handed to the payment gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutIntent {
    /// Generated unique order id
    pub order_id: String,

    /// Buyer identity
    pub buyer: Buyer,

    /// Line items snapshot at intent-creation time
    pub items: Vec<LineItem>,

    /// Derived order total
    pub total: Price,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl CheckoutIntent {
    /// Build an intent from a validated buyer and a non-empty cart.
    ///
    /// The cart snapshot is copied in; later cart mutations do not
    /// affect an intent already handed to the gateway.
    pub fn new(buyer: Buyer, cart: &Cart) -> CartResult<Self> {
        if cart.is_empty() {
            return Err(CartError::Validation(
                "cannot check out an empty cart".into(),
            ));
        }
        buyer.validate()?;

        Ok(Self {
            order_id: format!("ORD_{}", Uuid::new_v4().simple()),
            buyer,
            items: cart.items.clone(),
            total: pricing::total(cart),
            created_at: Utc::now(),
        })
    }
}
