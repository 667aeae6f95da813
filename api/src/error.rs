//! Unified error types for the SchoolPay API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic and persistence errors
//! - `GatewayError`: Payment gateway adapter errors (checkout links and callbacks)
//! - `NotificationError`: Outbound notification errors (always recovered locally)
//! - `AppError`: Application layer errors (wraps the above for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Promocode expired: {0}")]
    PromocodeExpired(String),
}

/// Payment gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success response from the provider, carrying its own message
    #[error("Gateway error: {status} - {message}")]
    Api { status: String, message: String },

    #[error("Callback authentication failed")]
    AuthenticationFailed,

    #[error("Invalid callback payload: {0}")]
    InvalidInput(String),

    #[error("Callback signature mismatch")]
    TransactionInvalid,

    #[error("Unsupported payment gateway: {0}")]
    UnsupportedGateway(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mail API rejected message: {status} - {message}")]
    Rejected { status: u16, message: String },
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    #[error("Promocode not found: {0}")]
    PromoNotFound(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::PromocodeExpired(code)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Promocode expired",
                Some(code.clone()),
            ),
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Gateway(e) => match e {
                GatewayError::AuthenticationFailed => {
                    (StatusCode::UNAUTHORIZED, "Authentication failed", None)
                }
                GatewayError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "Invalid input", Some(msg.clone()))
                }
                GatewayError::TransactionInvalid => {
                    (StatusCode::BAD_REQUEST, "Transaction invalid", None)
                }
                GatewayError::UnsupportedGateway(kind) => (
                    StatusCode::NOT_FOUND,
                    "Unsupported gateway",
                    Some(kind.clone()),
                ),
                GatewayError::Api { message, .. } => {
                    tracing::warn!("Gateway rejected request: {}", e);
                    (
                        StatusCode::BAD_GATEWAY,
                        "Payment gateway error",
                        Some(message.clone()),
                    )
                }
                _ => {
                    tracing::error!("Gateway error: {}", e);
                    (StatusCode::BAD_GATEWAY, "Payment gateway error", None)
                }
            },
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::OfferNotFound(msg) => {
                (StatusCode::NOT_FOUND, "Offer not found", Some(msg.clone()))
            }
            AppError::PromoNotFound(msg) => (
                StatusCode::NOT_FOUND,
                "Promocode not found",
                Some(msg.clone()),
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
