//! Razorpay Orders API client.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::{to_minor_units, verify_signature, GatewayError, Order, PaymentGateway};
use crate::config::RazorpayConfig;

#[derive(Clone)]
pub struct RazorpayGateway {
    client: Client,
    config: RazorpayConfig,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: u64,
    currency: &'a str,
    receipt: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: u64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    code: String,
    description: String,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.key_id.is_empty() && !self.config.key_secret.expose_secret().is_empty()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    async fn decode_order(response: reqwest::Response) -> Result<Order, GatewayError> {
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, "Razorpay orders response");

        if status.is_success() {
            let order: RazorpayOrder = serde_json::from_str(&body)?;
            Ok(Order {
                id: order.id,
                amount: order.amount,
                currency: order.currency,
            })
        } else {
            let detail = serde_json::from_str::<RazorpayError>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| RazorpayErrorDetail {
                    code: status.as_u16().to_string(),
                    description: body.clone(),
                });
            tracing::error!(
                code = %detail.code,
                description = %detail.description,
                "Razorpay request failed"
            );
            Err(GatewayError::Api {
                code: detail.code,
                description: detail.description,
            })
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, amount: Decimal) -> Result<Order, GatewayError> {
        if !self.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let request = CreateOrderRequest {
            amount: to_minor_units(amount)?,
            currency: &self.config.currency,
            receipt: format!("receipt_order_{}", Utc::now().timestamp_millis()),
        };

        let response = self
            .client
            .post(self.url("/orders"))
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        let order = Self::decode_order(response).await?;
        tracing::info!(
            order_id = %order.id,
            amount = order.amount,
            currency = %order.currency,
            "Razorpay order created"
        );
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Order, GatewayError> {
        if !self.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let response = self
            .client
            .get(self.url(&format!("/orders/{}", order_id)))
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .send()
            .await?;

        Self::decode_order(response).await
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let is_valid = verify_signature(
            order_id,
            payment_id,
            signature,
            self.config.key_secret.expose_secret(),
        );

        if is_valid {
            tracing::info!(order_id, payment_id, "Payment signature verified");
        } else {
            tracing::warn!(order_id, payment_id, "Payment signature verification failed");
        }

        is_valid
    }
}
