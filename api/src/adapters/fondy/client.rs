//! Fondy checkout client and callback verifier

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::signature::{callback_signature, sign, signatures_match};
use crate::domain::entities::OrderId;
use crate::domain::ports::{
    FondyCallback, GatewayCallback, GatewayKind, GatewayPayload, PaymentGateway,
    PaymentLinkRequest, PaymentOutcome,
};
use crate::error::GatewayError;

/// Merchant credentials and endpoints
#[derive(Debug, Clone)]
pub struct FondyConfig {
    pub merchant_id: String,
    pub secret_key: String,
    /// Checkout URL endpoint
    pub checkout_url: String,
    /// User-Agent Fondy's callback workers declare
    pub callback_user_agent: String,
    /// Checkout page language
    pub lang: String,
}

/// Fondy implementation of the payment gateway port
pub struct FondyGateway {
    http: Client,
    config: FondyConfig,
}

impl FondyGateway {
    pub fn new(config: FondyConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn checkout_request(&self, request: &PaymentLinkRequest) -> CheckoutRequest {
        let mut body = CheckoutRequest {
            order_id: request.order_id.to_string(),
            merchant_id: self.config.merchant_id.clone(),
            order_desc: request.description.clone(),
            signature: String::new(),
            amount: request.amount.to_string(),
            currency: request.currency.clone(),
            response_url: request.redirect_url.clone(),
            server_callback_url: request.callback_url.clone(),
            lang: self.config.lang.clone(),
        };
        body.signature = sign(&self.config.secret_key, &body.signed_fields());
        body
    }
}

#[derive(Debug, Serialize)]
struct CheckoutEnvelope {
    request: CheckoutRequest,
}

#[derive(Debug, Serialize)]
struct CheckoutRequest {
    order_id: String,
    merchant_id: String,
    order_desc: String,
    signature: String,
    amount: String,
    currency: String,
    response_url: String,
    server_callback_url: String,
    lang: String,
}

impl CheckoutRequest {
    fn signed_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("amount", self.amount.as_str()),
            ("currency", self.currency.as_str()),
            ("lang", self.lang.as_str()),
            ("merchant_id", self.merchant_id.as_str()),
            ("order_desc", self.order_desc.as_str()),
            ("order_id", self.order_id.as_str()),
            ("response_url", self.response_url.as_str()),
            ("server_callback_url", self.server_callback_url.as_str()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct CheckoutResponseEnvelope {
    response: CheckoutResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CheckoutResponse {
    response_status: String,
    checkout_url: String,
    payment_id: serde_json::Value,
    error_message: String,
    error_code: serde_json::Value,
}

#[async_trait]
impl PaymentGateway for FondyGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Fondy
    }

    async fn generate_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<String, GatewayError> {
        let envelope = CheckoutEnvelope {
            request: self.checkout_request(request),
        };

        let response = self
            .http
            .post(&self.config.checkout_url)
            .json(&envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16().to_string(),
                message,
            });
        }

        let body: CheckoutResponseEnvelope = response
            .json()
            .await
            .map_err(|e| GatewayError::Deserialization(e.to_string()))?;
        let body = body.response;

        if body.response_status != "success" {
            tracing::warn!(
                order_id = %request.order_id,
                error_code = %body.error_code,
                error_message = %body.error_message,
                "Fondy rejected checkout request"
            );
            return Err(GatewayError::Api {
                status: body.response_status,
                message: body.error_message,
            });
        }

        if body.checkout_url.is_empty() {
            return Err(GatewayError::Deserialization(
                "checkout_url missing from successful response".to_string(),
            ));
        }

        tracing::debug!(
            order_id = %request.order_id,
            payment_id = %body.payment_id,
            "Fondy checkout link created"
        );
        Ok(body.checkout_url)
    }

    fn authenticate(&self, client_identity: Option<&str>) -> Result<(), GatewayError> {
        match client_identity {
            Some(ua) if ua == self.config.callback_user_agent => Ok(()),
            _ => Err(GatewayError::AuthenticationFailed),
        }
    }

    fn parse_callback(&self, body: &[u8]) -> Result<GatewayCallback, GatewayError> {
        let raw_payload = std::str::from_utf8(body)
            .map_err(|e| GatewayError::InvalidInput(e.to_string()))?
            .to_string();
        let payload: FondyCallback = serde_json::from_str(&raw_payload)
            .map_err(|e| GatewayError::InvalidInput(e.to_string()))?;

        for (name, value) in [
            ("order_id", &payload.order_id),
            ("order_status", &payload.order_status),
            ("response_status", &payload.response_status),
            ("signature", &payload.signature),
        ] {
            if value.is_empty() {
                return Err(GatewayError::InvalidInput(format!("missing {}", name)));
            }
        }

        let order_id = payload
            .order_id
            .parse::<uuid::Uuid>()
            .map_err(|e| GatewayError::InvalidInput(format!("order_id: {}", e)))?;

        Ok(GatewayCallback {
            order_id: OrderId(order_id),
            raw_payload,
            payload: GatewayPayload::Fondy(payload),
        })
    }

    fn validate_callback(&self, callback: &GatewayCallback) -> Result<(), GatewayError> {
        let GatewayPayload::Fondy(payload) = &callback.payload;

        if !payload.merchant_id.is_empty() && payload.merchant_id != self.config.merchant_id {
            return Err(GatewayError::TransactionInvalid);
        }

        let expected = callback_signature(&self.config.secret_key, payload);
        if !signatures_match(&expected, &payload.signature) {
            return Err(GatewayError::TransactionInvalid);
        }
        Ok(())
    }

    fn outcome(&self, callback: &GatewayCallback) -> PaymentOutcome {
        let GatewayPayload::Fondy(payload) = &callback.payload;
        fondy_outcome(&payload.order_status, &payload.response_status)
    }
}

/// Map Fondy `order_status` / `response_status` onto the canonical outcome
fn fondy_outcome(order_status: &str, response_status: &str) -> PaymentOutcome {
    match (order_status, response_status) {
        ("approved", "success") => PaymentOutcome::Approved,
        (_, "failure") => PaymentOutcome::Declined,
        ("declined" | "expired" | "reversed", _) => PaymentOutcome::Declined,
        _ => PaymentOutcome::Pending,
    }
}
