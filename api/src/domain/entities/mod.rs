//! Domain entities
//!
//! Pure domain models for orders, offers, promocodes and student entitlements.
//! These are separate from the SeaORM entities in the `entity` module.

/// Declares a UUID-backed identifier newtype
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub mod offer;
pub mod order;
pub mod promocode;
pub mod student;

uuid_id!(
    /// Unique identifier for a school (tenant)
    SchoolId
);

pub use offer::{CourseId, Module, ModuleId, Offer, OfferId, PackageId};
pub use order::{
    NewOrder, OfferSnapshot, Order, OrderFilter, OrderId, OrderPage, OrderStatus, PromoSnapshot,
    StudentSnapshot, Transaction, DEFAULT_PAGE_LIMIT,
};
pub use promocode::{Promocode, PromocodeId};
pub use student::{Entitlement, Student, StudentId};
