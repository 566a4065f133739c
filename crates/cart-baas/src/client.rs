//! # Hosted Catalog Client
//!
//! `CatalogService` over the hosted table API's REST surface. Rows
//! travel in the table's own column shapes and are converted at this
//! boundary; raw provider errors never leave the crate.

use crate::config::BaasConfig;
use async_trait::async_trait;
use cart_core::{
    CartError, CartResult, CatalogService, OrderRecord, Price, Product, ProductFilter,
    ProductStatus,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

const PRODUCTS_TABLE: &str = "products";
const ORDERS_TABLE: &str = "orders";

/// A `products` row as stored in the hosted table
#[derive(Debug, Deserialize)]
struct ProductRow {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    /// Decimal dollars in the table; converted to minor units here
    price: f64,
    main_category: String,
    #[serde(default)]
    subcategory: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    is_opensource: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let status = match row.status.as_deref() {
            Some("active") | None => ProductStatus::Active,
            _ => ProductStatus::Inactive,
        };
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: Price::new(row.price, Default::default()),
            main_category: row.main_category,
            subcategory: row.subcategory,
            status,
            images: row.images,
            download_url: row.download_url,
            open_source: row.is_opensource,
        }
    }
}

/// An `orders` row in the hosted table's column shape
#[derive(Debug, Serialize)]
struct OrderRow {
    order_id: String,
    customer_name: String,
    customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_phone: Option<String>,
    /// Decimal dollars, matching the table column
    total_amount: f64,
    payment_status: String,
    payment_reference: String,
    transaction_id: String,
    items: Value,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn from_record(record: &OrderRecord) -> CartResult<Self> {
        let items = serde_json::to_value(&record.items)
            .map_err(|e| CartError::Serialization(e.to_string()))?;
        let payment_status = serde_json::to_value(record.payment_status)
            .map_err(|e| CartError::Serialization(e.to_string()))?
            .as_str()
            .unwrap_or("completed")
            .to_string();
        Ok(Self {
            order_id: record.order_id.clone(),
            customer_name: record.customer_name.clone(),
            customer_email: record.customer_email.clone(),
            customer_phone: record.customer_phone.clone(),
            total_amount: record.total.as_decimal(),
            payment_status,
            payment_reference: record.payment_reference.clone(),
            transaction_id: record.payment_reference.clone(),
            items,
            created_at: record.created_at,
        })
    }
}

/// Catalog service backed by the hosted table API
pub struct HostedCatalog {
    config: BaasConfig,
    client: Client,
}

impl HostedCatalog {
    /// Create a new hosted catalog client
    pub fn new(config: BaasConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> CartResult<Self> {
        let config = BaasConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Query pairs for a product filter (`column=eq.value` operators)
    fn filter_query(filter: &ProductFilter) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        if let Some(status) = filter.status {
            pairs.push(("status".to_string(), format!("eq.{}", status.as_str())));
        }
        if let Some(ref category) = filter.main_category {
            pairs.push(("main_category".to_string(), format!("eq.{category}")));
        }
        if let Some(ref subcategory) = filter.subcategory {
            pairs.push(("subcategory".to_string(), format!("eq.{subcategory}")));
        }
        pairs
    }

    async fn fetch_rows(&self, query: &[(String, String)]) -> CartResult<Vec<ProductRow>> {
        let url = self.config.table_url(PRODUCTS_TABLE);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", self.config.auth_header())
            .query(query)
            .send()
            .await
            .map_err(|e| CartError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CartError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("table API error: status={}, body={}", status, body);
            return Err(CartError::Network(format!(
                "product query failed with HTTP {status}"
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| CartError::Serialization(format!("failed to parse product rows: {e}")))
    }
}

#[async_trait]
impl CatalogService for HostedCatalog {
    #[instrument(skip(self))]
    async fn product(&self, id: &str) -> CartResult<Option<Product>> {
        let query = vec![
            ("select".to_string(), "*".to_string()),
            ("id".to_string(), format!("eq.{id}")),
        ];
        let rows = self.fetch_rows(&query).await?;
        // An empty result set is not-found, never an error
        Ok(rows.into_iter().next().map(Product::from))
    }

    #[instrument(skip(self, filter))]
    async fn products(&self, filter: &ProductFilter) -> CartResult<Vec<Product>> {
        let query = Self::filter_query(filter);
        debug!("querying products: {:?}", query);
        let rows = self.fetch_rows(&query).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self, order), fields(order_id = %order.order_id))]
    async fn insert_order(&self, order: &OrderRecord) -> CartResult<()> {
        let row = OrderRow::from_record(order)?;
        let url = self.config.table_url(ORDERS_TABLE);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", self.config.auth_header())
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| CartError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("order insert failed: status={}, body={}", status, body);
            return Err(CartError::Persistence(format!(
                "order insert failed with HTTP {status}"
            )));
        }

        info!("order record inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::{Buyer, Cart, CheckoutIntent, LineItem};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog_for(server: &MockServer) -> HostedCatalog {
        HostedCatalog::new(BaasConfig::new(server.uri(), "key_test"))
    }

    fn product_row() -> Value {
        json!({
            "id": "p1",
            "name": "Portfolio Template",
            "description": "A portfolio starter",
            "price": 29.99,
            "main_category": "html-css-js",
            "subcategory": "Portfolio",
            "status": "active",
            "images": ["https://cdn.example.com/p1.png"],
            "download_url": "https://cdn.example.com/p1.zip",
            "is_opensource": false
        })
    }

    #[tokio::test]
    async fn test_products_builds_filter_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .and(query_param("status", "eq.active"))
            .and(query_param("main_category", "eq.html-css-js"))
            .and(header("apikey", "key_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_row()])))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        let filter = ProductFilter::active().with_main_category("html-css-js");
        let products = catalog.products(&filter).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "p1");
        assert_eq!(products[0].price.amount_minor, 2999);
        assert_eq!(products[0].status, ProductStatus::Active);
    }

    #[tokio::test]
    async fn test_product_not_found_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .and(query_param("id", "eq.missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        assert!(catalog.product("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_error_translates_to_network() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        let err = catalog
            .products(&ProductFilter::active())
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Network(_)));
    }

    fn order_record() -> OrderRecord {
        let cart = Cart {
            items: vec![LineItem {
                product_id: "p1".into(),
                name: "Portfolio Template".into(),
                unit_price: Price::new(29.99, Default::default()),
                quantity: 1,
                image_url: None,
                download_url: None,
            }],
        };
        let intent = CheckoutIntent::new(Buyer::new("Ana", "ana@example.com"), &cart).unwrap();
        OrderRecord::from_intent(&intent, "txn_1")
    }

    #[tokio::test]
    async fn test_insert_order() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/orders"))
            .and(header("Prefer", "return=minimal"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        catalog.insert_order(&order_record()).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_failure_translates_to_persistence() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/orders"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
            .mount(&server)
            .await;

        let catalog = catalog_for(&server);
        let err = catalog.insert_order(&order_record()).await.unwrap_err();
        assert!(matches!(err, CartError::Persistence(_)));
    }
}
