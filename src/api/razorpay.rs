use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{GatewayError, PaymentGateway};
use crate::config::RazorpayConfig;

const CURRENCY: &str = "INR";

#[derive(Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    partial_payment: bool,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    id: String,
}

#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    base_url: String,
    key: String,
    secret: String,
}

impl RazorpayClient {
    pub fn new(config: &RazorpayConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build payment provider HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key: config.key.clone(),
            secret: config.secret.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, amount: i64) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key, Some(&self.secret))
            .json(&CreateOrderRequest {
                amount,
                currency: CURRENCY,
                partial_payment: false,
            })
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Razorpay request failed");
                GatewayError::Unreachable("Razorpay".into())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let order: CreateOrderResponse = response
            .json()
            .await
            .context("Failed to parse Razorpay order response")?;

        Ok(order.id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{basic_auth, body_json, method, path},
    };

    use super::*;

    fn client(base_url: &str) -> RazorpayClient {
        RazorpayClient::new(&RazorpayConfig {
            key: "rzp_test_key".into(),
            secret: "rzp_test_secret".into(),
            base_url: format!("{base_url}/"),
            timeout_secs: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn creates_order_with_amount_in_minor_units() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .and(basic_auth("rzp_test_key", "rzp_test_secret"))
            .and(body_json(json!({
                "amount": 50_000,
                "currency": "INR",
                "partial_payment": false
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "order_Nq8d2", "status": "created" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server.uri()).create_order(50_000).await.unwrap();

        assert_eq!(id, "order_Nq8d2");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Authentication failed"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).create_order(100).await.unwrap_err();

        match err {
            GatewayError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Authentication failed");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_failure_is_unreachable() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let err = client(&format!("http://127.0.0.1:{port}"))
            .create_order(100)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Unreachable(service) if service == "Razorpay"));
    }

    #[tokio::test]
    async fn unparseable_body_is_an_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).create_order(100).await.unwrap_err();

        assert!(matches!(err, GatewayError::Other(_)));
    }
}
