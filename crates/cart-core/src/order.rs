//! # Order Records
//!
//! The persisted outcome of a paid checkout, owned by the catalog
//! service once written, plus the receipt projected back to the buyer.

use crate::cart::LineItem;
use crate::intent::CheckoutIntent;
use crate::money::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal payment state recorded on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Failed,
    Cancelled,
}

/// An order record persisted via the catalog service.
///
/// Created only after a gateway success callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order id from the checkout intent
    pub order_id: String,

    /// Buyer fields, denormalized onto the record
    pub customer_name: String,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,

    /// Order total
    pub total: Price,

    /// Payment state
    pub payment_status: PaymentStatus,

    /// Opaque transaction reference from the gateway
    pub payment_reference: String,

    /// Line items snapshot from the intent
    pub items: Vec<LineItem>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Build a completed order record from an intent and the gateway's
    /// transaction reference
    pub fn from_intent(intent: &CheckoutIntent, transaction_reference: impl Into<String>) -> Self {
        Self {
            order_id: intent.order_id.clone(),
            customer_name: intent.buyer.name.clone(),
            customer_email: intent.buyer.email.clone(),
            customer_phone: intent.buyer.phone.clone(),
            total: intent.total,
            payment_status: PaymentStatus::Completed,
            payment_reference: transaction_reference.into(),
            items: intent.items.clone(),
            created_at: Utc::now(),
        }
    }
}

/// A download reference on the receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRef {
    pub name: String,
    pub url: String,
}

/// What the buyer sees after a completed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub order_id: String,
    pub transaction_reference: String,
    pub total: Price,
    /// Per-item download references (digital products)
    pub downloads: Vec<DownloadRef>,
}

impl Receipt {
    /// Project a receipt from a persisted order record
    pub fn from_record(record: &OrderRecord) -> Self {
        Self {
            order_id: record.order_id.clone(),
            transaction_reference: record.payment_reference.clone(),
            total: record.total,
            downloads: record
                .items
                .iter()
                .filter_map(|item| {
                    item.download_url.as_ref().map(|url| DownloadRef {
                        name: item.name.clone(),
                        url: url.clone(),
                    })
                })
                .collect(),
        }
    }
}
