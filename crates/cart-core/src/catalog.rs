//! # Catalog Service
//!
//! The storefront's record store: a `products` collection to browse and
//! an `orders` collection to persist completed checkouts into. Hosted
//! implementations live in `cart-baas`; the fixture implementation here
//! backs tests and the configuration-selected offline/demo mode.

use crate::error::{CartError, CartResult};
use crate::money::Price;
use crate::order::OrderRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Product availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Active
    }
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Price
    pub price: Price,

    /// Top-level category (e.g., "html-css-js", "python")
    pub main_category: String,

    /// Subcategory within the main category
    #[serde(default)]
    pub subcategory: String,

    /// Availability status
    #[serde(default)]
    pub status: ProductStatus,

    /// Image URLs (first one is the thumbnail)
    #[serde(default)]
    pub images: Vec<String>,

    /// Download URL (digital products)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    /// Open-source products are free downloads
    #[serde(default)]
    pub open_source: bool,
}

impl Product {
    /// Check if the product can be purchased
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// Immutable filter parameters for a catalog query.
///
/// Passed explicitly into each query; there is no ambient
/// category/subcategory state anywhere.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to a main category
    pub main_category: Option<String>,

    /// Restrict to a subcategory
    pub subcategory: Option<String>,

    /// Restrict to a status (`None` means any)
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    /// Filter for active products only
    pub fn active() -> Self {
        Self {
            main_category: None,
            subcategory: None,
            status: Some(ProductStatus::Active),
        }
    }

    /// Builder: restrict to a main category
    pub fn with_main_category(mut self, category: impl Into<String>) -> Self {
        self.main_category = Some(category.into());
        self
    }

    /// Builder: restrict to a subcategory
    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// Check a product against the filter
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(status) = self.status {
            if product.status != status {
                return false;
            }
        }
        if let Some(ref cat) = self.main_category {
            if &product.main_category != cat {
                return false;
            }
        }
        if let Some(ref sub) = self.subcategory {
            if &product.subcategory != sub {
                return false;
            }
        }
        true
    }
}

/// Record-oriented access to the `products` and `orders` collections
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Read one product by id. `Ok(None)` when not found.
    async fn product(&self, id: &str) -> CartResult<Option<Product>>;

    /// Query products matching the filter; returns a fresh list each call
    async fn products(&self, filter: &ProductFilter) -> CartResult<Vec<Product>>;

    /// Insert one order record
    async fn insert_order(&self, order: &OrderRecord) -> CartResult<()>;
}

/// Type alias for a shared catalog service (dynamic dispatch)
pub type BoxedCatalog = Arc<dyn CatalogService>;

/// TOML shape for fixture catalog data (`config/products.toml`)
#[derive(Debug, Default, Deserialize)]
struct FixtureData {
    #[serde(default)]
    products: Vec<Product>,
}

/// In-memory catalog for tests and the offline/demo mode.
///
/// Selected by configuration, never as a silent fallback when the
/// hosted catalog errors. The `unavailable` construction turns every
/// call into a network failure for exercising degraded paths.
#[derive(Default)]
pub struct FixtureCatalog {
    products: Vec<Product>,
    orders: Mutex<Vec<OrderRecord>>,
    unavailable: bool,
}

impl FixtureCatalog {
    /// Create an empty fixture catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fixture products from a TOML string
    pub fn from_toml(toml_str: &str) -> CartResult<Self> {
        let data: FixtureData =
            toml::from_str(toml_str).map_err(|e| CartError::Serialization(e.to_string()))?;
        Ok(Self {
            products: data.products,
            orders: Mutex::new(Vec::new()),
            unavailable: false,
        })
    }

    /// A catalog whose every operation fails as unreachable
    pub fn unavailable() -> Self {
        Self {
            products: Vec::new(),
            orders: Mutex::new(Vec::new()),
            unavailable: true,
        }
    }

    /// Builder: add a product
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Orders inserted so far (test inspection)
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.orders.lock().expect("orders lock poisoned").clone()
    }

    fn check_reachable(&self) -> CartResult<()> {
        if self.unavailable {
            return Err(CartError::Network("catalog unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for FixtureCatalog {
    async fn product(&self, id: &str) -> CartResult<Option<Product>> {
        self.check_reachable()?;
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn products(&self, filter: &ProductFilter) -> CartResult<Vec<Product>> {
        self.check_reachable()?;
        Ok(self
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn insert_order(&self, order: &OrderRecord) -> CartResult<()> {
        self.check_reachable()?;
        self.orders
            .lock()
            .expect("orders lock poisoned")
            .push(order.clone());
        Ok(())
    }
}
