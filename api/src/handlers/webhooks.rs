//! Webhook handlers
//!
//! Payment gateway callbacks. The gateway is named by the last path segment.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;

use crate::domain::entities::OrderStatus;
use crate::domain::ports::GatewayKind;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub access_granted: bool,
}

/// POST /webhooks/:gateway
///
/// The caller's `User-Agent` is the transport fingerprint checked before
/// anything in the body is looked at.
pub async fn payment_webhook(
    State(state): State<AppState>,
    Path(gateway): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    let kind: GatewayKind = gateway.parse()?;
    let client_identity = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    tracing::debug!(gateway = %kind, bytes = body.len(), "Webhook received");

    let result = state
        .callback_service
        .process(kind, client_identity, &body)
        .await?;

    Ok(Json(WebhookResponse {
        order_id: result.order_id.to_string(),
        status: result.status,
        access_granted: result.access_granted,
    }))
}
