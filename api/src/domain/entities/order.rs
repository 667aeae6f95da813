//! Order domain entity
//!
//! An order is a single purchase attempt. Its student, offer and promo fields are
//! snapshots taken at creation time, never live references: they are not re-read
//! or re-synced from the student/offer records afterwards.
//!
//! The transaction list is append-only and `status` always mirrors the most
//! recently appended transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::offer::{Offer, OfferId};
use super::promocode::{Promocode, PromocodeId};
use super::student::{Student, StudentId};
use super::SchoolId;

uuid_id!(
    /// Unique identifier for an order
    OrderId
);

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Failed,
    Canceled,
    /// Pending or ambiguous gateway outcome
    Other,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "created"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Failed => write!(f, "failed"),
            OrderStatus::Canceled => write!(f, "canceled"),
            OrderStatus::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(OrderStatus::Created),
            "paid" => Ok(OrderStatus::Paid),
            "failed" => Ok(OrderStatus::Failed),
            "canceled" | "cancelled" => Ok(OrderStatus::Canceled),
            "other" => Ok(OrderStatus::Other),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

/// Purchasing student as of order creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSnapshot {
    pub id: StudentId,
    pub name: String,
    pub email: String,
}

impl From<&Student> for StudentSnapshot {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
        }
    }
}

/// Purchased offer as of order creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSnapshot {
    pub id: OfferId,
    pub name: String,
}

impl From<&Offer> for OfferSnapshot {
    fn from(offer: &Offer) -> Self {
        Self {
            id: offer.id,
            name: offer.name.clone(),
        }
    }
}

/// Applied promocode as of order creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoSnapshot {
    pub id: PromocodeId,
    pub code: String,
}

impl From<&Promocode> for PromoSnapshot {
    fn from(promo: &Promocode) -> Self {
        Self {
            id: promo.id,
            code: promo.code.clone(),
        }
    }
}

/// One gateway-reported outcome appended to an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// The gateway's full callback body, kept for audit
    pub raw_payload: String,
}

impl Transaction {
    pub fn new(status: OrderStatus, raw_payload: impl Into<String>) -> Self {
        Self {
            status,
            created_at: Utc::now(),
            raw_payload: raw_payload.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub school_id: SchoolId,
    pub student: StudentSnapshot,
    pub offer: OfferSnapshot,
    pub promo: Option<PromoSnapshot>,
    /// Amount in minor currency units
    pub amount: u64,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
}

impl Order {
    /// Case-insensitive match against the name/code snapshots
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.student.name.to_lowercase().contains(&term)
            || self.student.email.to_lowercase().contains(&term)
            || self.offer.name.to_lowercase().contains(&term)
            || self
                .promo
                .as_ref()
                .is_some_and(|p| p.code.to_lowercase().contains(&term))
    }
}

/// Data needed to create a new order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub school_id: SchoolId,
    pub student: StudentSnapshot,
    pub offer: OfferSnapshot,
    pub promo: Option<PromoSnapshot>,
    pub amount: u64,
    pub currency: String,
}

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Read-side query over a school's orders. All set filters must match.
#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            created_from: None,
            created_to: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl OrderFilter {
    /// Clamp page and limit into their valid ranges
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, MAX_PAGE_LIMIT);
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1) * self.limit
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.search
            .as_deref()
            .map_or(true, |term| order.matches_search(term))
            && self.status.map_or(true, |s| order.status == s)
            && self.created_from.map_or(true, |from| order.created_at >= from)
            && self.created_to.map_or(true, |to| order.created_at <= to)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}
