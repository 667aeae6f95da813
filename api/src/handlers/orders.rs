//! Order handlers
//!
//! Checkout, order lookup and the per-school order listing.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::CreateOrder;
use crate::domain::entities::{
    OfferId, Order, OrderFilter, OrderId, OrderPage, OrderStatus, PromocodeId, SchoolId, StudentId,
    DEFAULT_PAGE_LIMIT,
};
use crate::domain::ports::GatewayKind;
use crate::error::AppError;
use crate::AppState;

/// Request to create an order and start checkout
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub student_id: Uuid,
    pub offer_id: Uuid,
    #[serde(default)]
    pub promocode_id: Option<Uuid>,
    /// Payment provider; defaults to Fondy
    #[serde(default)]
    pub gateway: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

fn transaction_responses(order: &mut Order) -> Vec<TransactionResponse> {
    order
        .transactions
        .drain(..)
        .map(|t| TransactionResponse {
            status: t.status,
            created_at: t.created_at,
        })
        .collect()
}

/// Full order view for admin listings
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub school_id: String,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub offer_id: String,
    pub offer_name: String,
    pub promocode: Option<String>,
    pub amount: u64,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub transactions: Vec<TransactionResponse>,
}

impl From<Order> for OrderResponse {
    fn from(mut order: Order) -> Self {
        let transactions = transaction_responses(&mut order);
        Self {
            id: order.id.to_string(),
            school_id: order.school_id.to_string(),
            student_id: order.student.id.to_string(),
            student_name: order.student.name,
            student_email: order.student.email,
            offer_id: order.offer.id.to_string(),
            offer_name: order.offer.name,
            promocode: order.promo.map(|p| p.code),
            amount: order.amount,
            currency: order.currency,
            status: order.status,
            created_at: order.created_at,
            transactions,
        }
    }
}

/// Order view for unauthenticated callers; carries no student data
#[derive(Debug, Serialize)]
pub struct PublicOrderResponse {
    pub id: String,
    pub offer_id: String,
    pub offer_name: String,
    pub promocode: Option<String>,
    pub amount: u64,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub transactions: Vec<TransactionResponse>,
}

impl From<Order> for PublicOrderResponse {
    fn from(mut order: Order) -> Self {
        let transactions = transaction_responses(&mut order);
        Self {
            id: order.id.to_string(),
            offer_id: order.offer.id.to_string(),
            offer_name: order.offer.name,
            promocode: order.promo.map(|p| p.code),
            amount: order.amount,
            currency: order.currency,
            status: order.status,
            created_at: order.created_at,
            transactions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: PublicOrderResponse,
    pub checkout_url: String,
}

/// Query parameters for listing a school's orders
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_LIMIT
}

impl ListOrdersQuery {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        let status = self
            .status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<OrderStatus>())
            .transpose()
            .map_err(AppError::BadRequest)?;

        Ok(OrderFilter {
            search: self.search,
            status,
            created_from: self.from,
            created_to: self.to,
            page: self.page,
            limit: self.limit,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub items: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl From<OrderPage> for OrderListResponse {
    fn from(page: OrderPage) -> Self {
        Self {
            items: page.items.into_iter().map(OrderResponse::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

/// POST /schools/:school_id/orders
///
/// Create an order and return the gateway checkout link.
pub async fn create_order(
    State(state): State<AppState>,
    Path(school_id): Path<Uuid>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), AppError> {
    let kind = match req.gateway.as_deref() {
        Some(name) => name.parse::<GatewayKind>()?,
        None => GatewayKind::Fondy,
    };

    let request = CreateOrder {
        school_id: SchoolId(school_id),
        student_id: StudentId(req.student_id),
        offer_id: OfferId(req.offer_id),
        promocode_id: req.promocode_id.map(PromocodeId),
    };

    let (order, checkout_url) = state.order_service.checkout(&request, kind).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order: order.into(),
            checkout_url,
        }),
    ))
}

/// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicOrderResponse>, AppError> {
    let order = state.order_service.get_by_id(&OrderId(id)).await?;
    Ok(Json(order.into()))
}

/// GET /schools/:school_id/orders
///
/// Search and page through a school's orders, newest first.
pub async fn list_school_orders(
    State(state): State<AppState>,
    Path(school_id): Path<Uuid>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<OrderListResponse>, AppError> {
    let filter = query.into_filter()?;
    let page = state
        .order_service
        .list_by_school(&SchoolId(school_id), filter)
        .await?;
    Ok(Json(page.into()))
}
