//! # Hosted Gateway Client
//!
//! `PaymentGateway` over the provider's payments API. One POST per
//! intent, one terminal outcome back. Provider error payloads are
//! translated here and never reach the reconciliation logic raw.

use crate::config::GatewayConfig;
use async_trait::async_trait;
use cart_core::{CartError, CartResult, CheckoutIntent, PaymentGateway, PaymentOutcome};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "verifone";

/// Payment gateway backed by the provider's hosted checkout API
pub struct HostedGateway {
    config: GatewayConfig,
    client: Client,
}

impl HostedGateway {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> CartResult<Self> {
        let config = GatewayConfig::from_env()?;
        Ok(Self::new(config))
    }

    fn build_request(&self, intent: &CheckoutIntent) -> PaymentRequest {
        PaymentRequest {
            merchant_id: self.config.merchant_id.clone(),
            order_id: intent.order_id.clone(),
            amount_minor: intent.total.amount_minor,
            currency: intent.total.currency.as_str().to_string(),
            customer: PaymentCustomer {
                name: intent.buyer.name.clone(),
                email: intent.buyer.email.clone(),
                phone: intent.buyer.phone.clone(),
            },
            items: intent
                .items
                .iter()
                .map(|item| PaymentItem {
                    name: item.name.clone(),
                    unit_amount_minor: item.unit_price.amount_minor,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }

    fn gateway_error(message: impl Into<String>) -> CartError {
        CartError::Gateway {
            provider: PROVIDER.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HostedGateway {
    #[instrument(skip(self, intent), fields(order_id = %intent.order_id))]
    async fn collect(&self, intent: &CheckoutIntent) -> CartResult<PaymentOutcome> {
        let request = self.build_request(intent);
        let url = format!("{}/v1/payments", self.config.api_base_url);

        debug!(
            "requesting payment: {} items, total={}",
            request.items.len(),
            intent.total.display()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::gateway_error(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::gateway_error(e.to_string()))?;

        if !status.is_success() {
            error!("gateway API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<GatewayErrorResponse>(&body) {
                return Err(Self::gateway_error(error_response.error.message));
            }
            return Err(Self::gateway_error(format!("HTTP {status}")));
        }

        let payment: PaymentResponse = serde_json::from_str(&body).map_err(|e| {
            CartError::Serialization(format!("failed to parse gateway response: {e}"))
        })?;

        let outcome = match payment.status.as_str() {
            "approved" => {
                let transaction_reference = payment.transaction_id.ok_or_else(|| {
                    Self::gateway_error("approved payment without a transaction id")
                })?;
                info!(reference = %transaction_reference, "payment approved");
                PaymentOutcome::Approved {
                    transaction_reference,
                }
            }
            "declined" => PaymentOutcome::Declined {
                reason: payment
                    .reason
                    .unwrap_or_else(|| "declined by provider".to_string()),
            },
            "cancelled" => PaymentOutcome::Cancelled,
            other => {
                return Err(Self::gateway_error(format!(
                    "unknown payment status: {other}"
                )))
            }
        };
        Ok(outcome)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Gateway API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct PaymentRequest {
    merchant_id: String,
    order_id: String,
    amount_minor: i64,
    currency: String,
    customer: PaymentCustomer,
    items: Vec<PaymentItem>,
}

#[derive(Debug, Serialize)]
struct PaymentCustomer {
    name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct PaymentItem {
    name: String,
    unit_amount_minor: i64,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    status: String,
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorResponse {
    error: GatewayErrorBody,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::{Buyer, Cart, LineItem, Price};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn intent() -> CheckoutIntent {
        let cart = Cart {
            items: vec![LineItem {
                product_id: "p1".into(),
                name: "Web App Kit".into(),
                unit_price: Price::new(49.99, Default::default()),
                quantity: 1,
                image_url: None,
                download_url: None,
            }],
        };
        CheckoutIntent::new(Buyer::new("Ana", "ana@example.com"), &cart).unwrap()
    }

    fn gateway_for(server: &MockServer) -> HostedGateway {
        HostedGateway::new(
            GatewayConfig::new("255781290131", "secret_0123456789abcdef")
                .with_api_base_url(server.uri()),
        )
    }

    #[tokio::test]
    async fn test_approved_payment() {
        let server = MockServer::start().await;
        let intent = intent();

        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .and(body_partial_json(json!({
                "merchant_id": "255781290131",
                "order_id": intent.order_id,
                "amount_minor": 4999,
                "currency": "usd"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "approved",
                "transaction_id": "txn_9f3"
            })))
            .mount(&server)
            .await;

        let outcome = gateway_for(&server).collect(&intent).await.unwrap();
        assert_eq!(outcome.transaction_reference(), Some("txn_9f3"));
    }

    #[tokio::test]
    async fn test_declined_payment() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "declined",
                "reason": "insufficient funds"
            })))
            .mount(&server)
            .await;

        let outcome = gateway_for(&server).collect(&intent()).await.unwrap();
        assert_eq!(
            outcome,
            PaymentOutcome::Declined {
                reason: "insufficient funds".into()
            }
        );
    }

    #[tokio::test]
    async fn test_cancelled_payment() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "cancelled" })),
            )
            .mount(&server)
            .await;

        let outcome = gateway_for(&server).collect(&intent()).await.unwrap();
        assert_eq!(outcome, PaymentOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_provider_error_is_translated() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({
                "error": { "message": "upstream acquirer timeout" }
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server).collect(&intent()).await.unwrap_err();
        match err {
            CartError::Gateway { provider, message } => {
                assert_eq!(provider, "verifone");
                assert_eq!(message, "upstream acquirer timeout");
            }
            other => panic!("expected gateway error, got {other:?}"),
        }
        assert!(CartError::Gateway {
            provider: "verifone".into(),
            message: String::new()
        }
        .is_recoverable());
    }

    #[tokio::test]
    async fn test_approved_without_reference_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "approved" })),
            )
            .mount(&server)
            .await;

        let err = gateway_for(&server).collect(&intent()).await.unwrap_err();
        assert!(matches!(err, CartError::Gateway { .. }));
    }
}
