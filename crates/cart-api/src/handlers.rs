//! # Request Handlers
//!
//! Axum request handlers for the storefront API. The checkout handler
//! re-reads unit prices from the catalog — client-submitted prices are
//! never trusted — then drives a checkout session through the gateway
//! and reconciles the outcome.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use cart_core::{
    Buyer, CartError, CartStore, CheckoutSession, LineItem, OrderReconciler, PaymentOutcome,
    Product, ProductFilter, Receipt,
};
use cart_gateway::verify_notification;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Signature header carried on gateway notifications
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Product listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub main_category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
}

impl ProductQuery {
    fn into_filter(self) -> ProductFilter {
        let mut filter = ProductFilter::active();
        if let Some(category) = self.main_category {
            filter = filter.with_main_category(category);
        }
        // "All" from the category tabs means no subcategory restriction
        match self.subcategory {
            Some(sub) if sub != "All" => filter.with_subcategory(sub),
            _ => filter,
        }
    }
}

/// Item in a checkout request
#[derive(Debug, Deserialize)]
pub struct CheckoutItem {
    /// Product ID
    pub product_id: String,
    /// Quantity
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Checkout request: the cart snapshot plus buyer fields
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    pub buyer_name: String,
    pub buyer_email: String,
    #[serde(default)]
    pub buyer_phone: Option<String>,
}

/// Checkout response
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// "completed" or "cancelled"
    pub status: &'static str,
    /// Receipt, present on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn cart_error_to_response(err: CartError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if let CartError::Persistence(_) = err {
        // The asymmetric post-payment state: funds are captured, the
        // order record is not saved. Distinct from a payment failure.
        response = response.with_details(
            "Payment was captured but the order could not be recorded. \
             Do not retry payment; contact support with your transaction reference.",
        );
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "codecart",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List products, filtered by explicit query parameters
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let filter = query.into_filter();
    let products = state
        .catalog
        .products(&filter)
        .await
        .map_err(cart_error_to_response)?;
    Ok(Json(products))
}

/// Get a single product by id
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .catalog
        .product(&product_id)
        .await
        .map_err(cart_error_to_response)?
        .ok_or_else(|| cart_error_to_response(CartError::ProductNotFound { product_id }))?;
    Ok(Json(product))
}

/// Run a full checkout: price the submitted items from the catalog,
/// validate the buyer, collect payment, reconcile the outcome.
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    if request.items.is_empty() {
        return Err(cart_error_to_response(CartError::Validation(
            "no items in checkout request".into(),
        )));
    }

    // Rebuild the cart server-side with catalog prices
    let mut cart = CartStore::in_memory();
    for item in &request.items {
        let product = state
            .catalog
            .product(&item.product_id)
            .await
            .map_err(cart_error_to_response)?
            .ok_or_else(|| {
                cart_error_to_response(CartError::ProductNotFound {
                    product_id: item.product_id.clone(),
                })
            })?;

        if !product.is_available() {
            return Err(cart_error_to_response(CartError::Validation(format!(
                "product is not available: {}",
                item.product_id
            ))));
        }

        cart.add(LineItem::from_product(&product, item.quantity));
    }

    let buyer = Buyer {
        name: request.buyer_name,
        email: request.buyer_email,
        phone: request.buyer_phone,
    };

    let snapshot = cart.snapshot();
    let mut session = CheckoutSession::new();
    session.begin(&snapshot).map_err(cart_error_to_response)?;
    let intent = session
        .submit(buyer, &snapshot)
        .map_err(cart_error_to_response)?
        .clone();

    info!(
        order_id = %intent.order_id,
        total = %intent.total.display(),
        "collecting payment via {}",
        state.gateway.provider_name()
    );

    let outcome = state
        .gateway
        .collect(&intent)
        .await
        .map_err(cart_error_to_response)?;
    session.settle(&outcome).map_err(cart_error_to_response)?;

    let mut reconciler = OrderReconciler::new(state.catalog.clone());
    match outcome {
        PaymentOutcome::Approved {
            ref transaction_reference,
        } => {
            let receipt = reconciler
                .on_success(&intent, transaction_reference, &mut cart)
                .await
                .map_err(cart_error_to_response)?;
            Ok(Json(CheckoutResponse {
                status: "completed",
                receipt: Some(receipt),
            }))
        }
        PaymentOutcome::Declined { reason } => {
            Err(cart_error_to_response(CartError::Declined { reason }))
        }
        PaymentOutcome::Cancelled => Ok(Json(CheckoutResponse {
            status: "cancelled",
            receipt: None,
        })),
    }
}

/// Gateway notification intake: verify the signature, log, ack.
///
/// Settlement happens synchronously inside [`checkout`] when the gateway
/// responds, so verified notifications are an audit trail, not a second
/// reconciliation path.
#[instrument(skip(state, headers, body))]
pub async fn payment_notification(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("missing notification signature", 401)),
            )
        })?;

    let notification = verify_notification(&body, signature, &state.gateway_secret)
        .map_err(|e| {
            warn!("rejected payment notification from {provider}: {e}");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(e.to_string(), 401)),
            )
        })?;

    info!(
        order_id = %notification.order_id,
        outcome = ?notification.outcome,
        "payment notification received from {provider}"
    );

    Ok(Json(serde_json::json!({
        "received": true,
        "order_id": notification.order_id
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cart_core::{
        CartResult, CheckoutIntent, FixtureCatalog, PaymentGateway, Price, ProductStatus,
    };
    use std::sync::Arc;

    struct StubGateway {
        outcome: fn() -> PaymentOutcome,
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn collect(&self, _intent: &CheckoutIntent) -> CartResult<PaymentOutcome> {
            Ok((self.outcome)())
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }
    }

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::new(price, Default::default()),
            main_category: "python".to_string(),
            subcategory: "Games".to_string(),
            status: ProductStatus::Active,
            images: vec![],
            download_url: Some(format!("https://cdn.example.com/{id}.zip")),
            open_source: false,
        }
    }

    fn state_with(catalog: FixtureCatalog, outcome: fn() -> PaymentOutcome) -> AppState {
        AppState::with_services(
            Arc::new(catalog),
            Arc::new(StubGateway { outcome }),
            "secret_0123456789abcdef",
        )
    }

    fn checkout_request() -> CheckoutRequest {
        CheckoutRequest {
            items: vec![CheckoutItem {
                product_id: "p1".into(),
                quantity: 2,
            }],
            buyer_name: "Ana".into(),
            buyer_email: "ana@example.com".into(),
            buyer_phone: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_completes_and_prices_from_catalog() {
        let catalog = FixtureCatalog::new().with_product(product("p1", 10.00));
        let state = state_with(catalog, || PaymentOutcome::Approved {
            transaction_reference: "txn_1".into(),
        });

        let Json(response) = checkout(State(state), Json(checkout_request()))
            .await
            .unwrap();

        assert_eq!(response.status, "completed");
        let receipt = response.receipt.unwrap();
        assert_eq!(receipt.total.amount_minor, 2000);
        assert_eq!(receipt.transaction_reference, "txn_1");
        assert_eq!(receipt.downloads.len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_unknown_product_is_404() {
        let state = state_with(FixtureCatalog::new(), || PaymentOutcome::Cancelled);

        let (status, _) = checkout(State(state), Json(checkout_request()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_checkout_invalid_email_is_400() {
        let catalog = FixtureCatalog::new().with_product(product("p1", 10.00));
        let state = state_with(catalog, || PaymentOutcome::Cancelled);

        let mut request = checkout_request();
        request.buyer_email = "bob@".into();

        let (status, _) = checkout(State(state), Json(request)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_declined_is_402() {
        let catalog = FixtureCatalog::new().with_product(product("p1", 10.00));
        let state = state_with(catalog, || PaymentOutcome::Declined {
            reason: "card declined".into(),
        });

        let (status, Json(body)) = checkout(State(state), Json(checkout_request()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert!(body.error.contains("card declined"));
    }

    #[tokio::test]
    async fn test_checkout_cancelled_has_no_receipt() {
        let catalog = FixtureCatalog::new().with_product(product("p1", 10.00));
        let state = state_with(catalog, || PaymentOutcome::Cancelled);

        let Json(response) = checkout(State(state), Json(checkout_request()))
            .await
            .unwrap();
        assert_eq!(response.status, "cancelled");
        assert!(response.receipt.is_none());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_distinct_support_state() {
        // Product lookups must succeed but the order insert must fail,
        // so chain an available catalog for reads with an unavailable
        // one for the insert via a small shim.
        struct ReadOnlyCatalog {
            products: FixtureCatalog,
        }

        #[async_trait]
        impl cart_core::CatalogService for ReadOnlyCatalog {
            async fn product(&self, id: &str) -> CartResult<Option<Product>> {
                self.products.product(id).await
            }

            async fn products(&self, filter: &ProductFilter) -> CartResult<Vec<Product>> {
                self.products.products(filter).await
            }

            async fn insert_order(&self, _order: &cart_core::OrderRecord) -> CartResult<()> {
                Err(CartError::Network("orders table unreachable".into()))
            }
        }

        let state = AppState::with_services(
            Arc::new(ReadOnlyCatalog {
                products: FixtureCatalog::new().with_product(product("p1", 10.00)),
            }),
            Arc::new(StubGateway {
                outcome: || PaymentOutcome::Approved {
                    transaction_reference: "txn_1".into(),
                },
            }),
            "secret_0123456789abcdef",
        );

        let (status, Json(body)) = checkout(State(state), Json(checkout_request()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.details.unwrap().contains("contact support"));
    }

    #[tokio::test]
    async fn test_list_products_applies_filter() {
        let catalog = FixtureCatalog::new()
            .with_product(product("p1", 10.00))
            .with_product({
                let mut p = product("p2", 5.00);
                p.main_category = "opensource".into();
                p
            });
        let state = state_with(catalog, || PaymentOutcome::Cancelled);

        let query = ProductQuery {
            main_category: Some("python".into()),
            subcategory: Some("All".into()),
        };
        let Json(products) = list_products(State(state), Query(query)).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "p1");
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let state = state_with(FixtureCatalog::new(), || PaymentOutcome::Cancelled);

        let (status, _) = get_product(State(state), Path("missing".into()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notification_rejects_bad_signature() {
        let state = state_with(FixtureCatalog::new(), || PaymentOutcome::Cancelled);

        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            format!("t={},v1={}", chrono_now(), "0".repeat(64))
                .parse()
                .unwrap(),
        );

        let result = payment_notification(
            State(state),
            Path("verifone".into()),
            headers,
            Bytes::from_static(br#"{"order_id":"ORD_1","status":"cancelled"}"#),
        )
        .await;

        let (status, _) = result.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_notification_accepts_valid_signature() {
        let state = state_with(FixtureCatalog::new(), || PaymentOutcome::Cancelled);

        let payload = br#"{"order_id":"ORD_1","status":"approved","transaction_id":"txn_1"}"#;
        let ts = chrono_now();
        let sig = cart_gateway::sign_payload("secret_0123456789abcdef", ts, payload);

        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, format!("t={ts},v1={sig}").parse().unwrap());

        let Json(ack) = payment_notification(
            State(state),
            Path("verifone".into()),
            headers,
            Bytes::from_static(payload),
        )
        .await
        .unwrap();

        assert_eq!(ack["received"], true);
        assert_eq!(ack["order_id"], "ORD_1");
    }

    fn chrono_now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }
}
