//! # Cart Store
//!
//! The client-local list of selected line items, persisted to a single
//! named storage slot on every mutation. The in-memory cart stays
//! authoritative for the session when storage fails.

use crate::catalog::Product;
use crate::error::{CartError, CartResult};
use crate::money::Price;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A line item in the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Product ID (identity key within the cart)
    pub product_id: String,

    /// Product name (denormalized for display)
    pub name: String,

    /// Unit price
    pub unit_price: Price,

    /// Quantity (always >= 1)
    pub quantity: u32,

    /// Optional thumbnail image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Optional download URL (digital products)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl LineItem {
    /// Create a line item from a catalog product
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: quantity.max(1),
            image_url: product.images.first().cloned(),
            download_url: product.download_url.clone(),
        }
    }

    /// Total price for this line (unit price x quantity)
    pub fn line_total(&self) -> Price {
        Price::from_minor(
            self.unit_price.amount_minor * self.quantity as i64,
            self.unit_price.currency,
        )
    }
}

/// Ordered sequence of line items, unique by product id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Find a line item by product id
    pub fn get(&self, product_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Check if the cart is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Single named storage slot holding the serialized cart.
///
/// Models browser-local storage: one key, read at initialization,
/// overwritten on every mutation.
pub trait CartStorage: Send {
    /// Read the slot. `Ok(None)` when the slot has never been written.
    fn load(&self) -> CartResult<Option<String>>;

    /// Overwrite the slot with the serialized cart.
    fn store(&mut self, payload: &str) -> CartResult<()>;

    /// Delete the slot.
    fn remove(&mut self) -> CartResult<()>;
}

/// In-memory storage slot (also the test double for browser storage)
#[derive(Debug, Default)]
pub struct MemorySlot {
    slot: Option<String>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Create a slot pre-seeded with a payload
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Some(payload.into()),
        }
    }
}

impl CartStorage for MemorySlot {
    fn load(&self) -> CartResult<Option<String>> {
        Ok(self.slot.clone())
    }

    fn store(&mut self, payload: &str) -> CartResult<()> {
        self.slot = Some(payload.to_string());
        Ok(())
    }

    fn remove(&mut self) -> CartResult<()> {
        self.slot = None;
        Ok(())
    }
}

/// Owns the cart and serializes every mutation around the persisted slot.
///
/// Mutators re-read the slot before applying a change so that rapid
/// back-to-back mutations never lose updates, then write the full
/// snapshot back. Storage failure is non-fatal: the store degrades to
/// in-memory-only for the rest of the session.
pub struct CartStore {
    cart: Cart,
    storage: Box<dyn CartStorage>,
    degraded: bool,
}

impl CartStore {
    /// Create a cart store backed by the given storage slot.
    ///
    /// An absent or corrupt slot loads as an empty cart, never an error.
    pub fn new(storage: Box<dyn CartStorage>) -> Self {
        let mut store = Self {
            cart: Cart::new(),
            storage,
            degraded: false,
        };
        store.refresh();
        store
    }

    /// Create a cart store with no backing storage beyond memory
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemorySlot::new()))
    }

    /// Add an item. A duplicate product id increments the existing
    /// line's quantity instead of appending a second entry.
    pub fn add(&mut self, item: LineItem) {
        self.refresh();
        match self
            .cart
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            Some(existing) => existing.quantity += item.quantity.max(1),
            None => self.cart.items.push(item),
        }
        self.persist();
    }

    /// Remove the line item for a product id. No-op when absent.
    pub fn remove(&mut self, product_id: &str) {
        self.refresh();
        self.cart.items.retain(|i| i.product_id != product_id);
        self.persist();
    }

    /// Empty the cart
    pub fn clear(&mut self) {
        self.refresh();
        self.cart.items.clear();
        if self.degraded {
            return;
        }
        if let Err(e) = self.storage.remove() {
            warn!("cart storage unavailable, continuing in-memory: {e}");
            self.degraded = true;
        }
    }

    /// Read-only copy of the cart; never aliases internal state
    pub fn snapshot(&self) -> Cart {
        self.cart.clone()
    }

    /// True once storage has failed and the cart is in-memory only
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Re-read the persisted slot so the mutation applies to the
    /// latest written state. The in-memory cart wins when the slot is
    /// unreadable or corrupt.
    fn refresh(&mut self) {
        if self.degraded {
            return;
        }
        match self.storage.load() {
            Ok(Some(payload)) => match serde_json::from_str::<Cart>(&payload) {
                Ok(cart) => self.cart = cart,
                Err(e) => warn!("discarding corrupt cart slot: {e}"),
            },
            Ok(None) => {}
            Err(e) => {
                warn!("cart storage unavailable, continuing in-memory: {e}");
                self.degraded = true;
            }
        }
    }

    fn persist(&mut self) {
        if self.degraded {
            return;
        }
        let payload = match serde_json::to_string(&self.cart) {
            Ok(p) => p,
            Err(e) => {
                warn!("cart serialization failed: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.store(&payload) {
            warn!("cart storage unavailable, continuing in-memory: {e}");
            self.degraded = true;
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("degraded", &self.degraded)
            .finish()
    }
}
