//! # Pricing
//!
//! Pure total/count derivations over a cart snapshot. Accumulation is
//! integer arithmetic over minor units; rounding to two decimals only
//! ever happens at display time.

use crate::cart::Cart;
use crate::money::{Currency, Price};

/// Order total: sum of unit price x quantity over all line items.
/// An empty cart totals zero.
pub fn total(cart: &Cart) -> Price {
    let currency = cart
        .items
        .first()
        .map(|i| i.unit_price.currency)
        .unwrap_or(Currency::USD);
    let amount_minor: i64 = cart.items.iter().map(|i| i.line_total().amount_minor).sum();
    Price::from_minor(amount_minor, currency)
}

/// Sum of quantities across all line items
pub fn item_count(cart: &Cart) -> u32 {
    cart.items.iter().map(|i| i.quantity).sum()
}
