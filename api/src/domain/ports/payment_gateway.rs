//! Payment gateway port
//!
//! A gateway produces checkout links and authenticates its own webhook callbacks.
//! Callbacks are carried as a tagged payload (`GatewayPayload`) and routed to the
//! adapter registered for their `GatewayKind`, never by inspecting payload types.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entities::{OrderId, OrderStatus};
use crate::error::GatewayError;

/// Supported payment providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    Fondy,
}

impl std::fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayKind::Fondy => write!(f, "fondy"),
        }
    }
}

impl std::str::FromStr for GatewayKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fondy" => Ok(GatewayKind::Fondy),
            _ => Err(GatewayError::UnsupportedGateway(s.to_string())),
        }
    }
}

/// Everything a gateway needs to build a checkout link
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub order_id: OrderId,
    /// Amount in minor currency units
    pub amount: u64,
    pub currency: String,
    pub description: String,
    /// Where the gateway delivers webhooks
    pub callback_url: String,
    /// Where the buyer lands after paying
    pub redirect_url: String,
}

/// Canonical gateway outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Approved and successful
    Approved,
    /// Explicit non-success
    Declined,
    /// Pending or anything the gateway leaves ambiguous
    Pending,
}

impl PaymentOutcome {
    pub fn order_status(self) -> OrderStatus {
        match self {
            PaymentOutcome::Approved => OrderStatus::Paid,
            PaymentOutcome::Declined => OrderStatus::Failed,
            PaymentOutcome::Pending => OrderStatus::Other,
        }
    }
}

/// Gateway-specific callback body, tagged by provider
#[derive(Debug, Clone)]
pub enum GatewayPayload {
    Fondy(FondyCallback),
}

impl GatewayPayload {
    pub fn kind(&self) -> GatewayKind {
        match self {
            GatewayPayload::Fondy(_) => GatewayKind::Fondy,
        }
    }
}

/// A parsed webhook delivery
#[derive(Debug, Clone)]
pub struct GatewayCallback {
    pub order_id: OrderId,
    /// The request body exactly as received
    pub raw_payload: String,
    pub payload: GatewayPayload,
}

impl GatewayCallback {
    pub fn kind(&self) -> GatewayKind {
        self.payload.kind()
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn kind(&self) -> GatewayKind;

    /// Request a hosted checkout URL for an order
    async fn generate_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<String, GatewayError>;

    /// Transport-level check of the caller's declared client identity.
    /// Runs before any parsing or signature work.
    fn authenticate(&self, client_identity: Option<&str>) -> Result<(), GatewayError>;

    /// Parse and shape-check a callback body
    fn parse_callback(&self, body: &[u8]) -> Result<GatewayCallback, GatewayError>;

    /// Verify the callback signature
    fn validate_callback(&self, callback: &GatewayCallback) -> Result<(), GatewayError>;

    /// Map the provider's status codes onto the canonical outcome
    fn outcome(&self, callback: &GatewayCallback) -> PaymentOutcome;
}

/// Accept strings, numbers and booleans as their textual form; null as empty
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Fondy server callback (protocol v1.0)
///
/// Fondy sends some values as JSON numbers; they are kept in their textual form
/// because the signature is computed over the text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FondyCallback {
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub order_id: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub merchant_id: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub amount: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub currency: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub order_status: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub response_status: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub signature: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub response_signature_string: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub tran_type: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub sender_cell_phone: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub sender_account: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub sender_email: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub masked_card: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub card_bin: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub card_type: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub rrn: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub approval_code: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub response_code: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub response_description: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub reversal_amount: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub settlement_amount: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub settlement_currency: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub settlement_date: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub order_time: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub eci: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub fee: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub payment_system: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub payment_id: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub actual_amount: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub actual_currency: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub product_id: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub merchant_data: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub verification_status: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub rectoken: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub rectoken_lifetime: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub parent_order_id: String,
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub additional_info: String,
}
