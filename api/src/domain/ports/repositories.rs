//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;

use crate::domain::entities::{
    Entitlement, Module, NewOrder, Offer, OfferId, Order, OrderFilter, OrderId, OrderPage,
    PackageId, Promocode, PromocodeId, SchoolId, Student, StudentId, Transaction,
};
use crate::error::DomainError;

/// The order ledger: single source of truth for order status
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order with status `created` and no transactions
    async fn create(&self, order: &NewOrder) -> Result<Order, DomainError>;

    /// Append a transaction and set the order status to its status, as one
    /// atomic operation scoped to the order id. Returns the updated order.
    ///
    /// Fails with `NotFound` if no order has this id.
    async fn add_transaction(
        &self,
        id: &OrderId,
        transaction: &Transaction,
    ) -> Result<Order, DomainError>;

    /// Mark the purchase confirmation as sent. Returns true only for the
    /// first caller; every later or concurrent call gets false.
    ///
    /// Fails with `NotFound` if no order has this id.
    async fn claim_confirmation(&self, id: &OrderId) -> Result<bool, DomainError>;

    /// Find an order (with its transaction history) by ID
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Page through a school's orders, newest first
    async fn find_by_school(
        &self,
        school_id: &SchoolId,
        filter: &OrderFilter,
    ) -> Result<OrderPage, DomainError>;
}

/// Read-only offer directory
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, DomainError>;
}

/// Read-only module directory
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// All modules belonging to any of the given packages
    async fn find_by_packages(&self, packages: &[PackageId]) -> Result<Vec<Module>, DomainError>;
}

/// Read-only promocode lookup
#[async_trait]
pub trait PromocodeRepository: Send + Sync {
    async fn find_by_id(&self, id: &PromocodeId) -> Result<Option<Promocode>, DomainError>;
}

/// Student records and their entitlement sets
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, DomainError>;

    /// Set-union the entitlement into the student's module/course sets
    async fn grant_access(
        &self,
        id: &StudentId,
        entitlement: &Entitlement,
    ) -> Result<(), DomainError>;

    /// Set-difference the entitlement out of the student's module/course sets
    async fn revoke_access(
        &self,
        id: &StudentId,
        entitlement: &Entitlement,
    ) -> Result<(), DomainError>;
}
