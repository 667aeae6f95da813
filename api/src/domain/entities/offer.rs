//! Offer, package and module entities
//!
//! An offer is a purchasable bundle of packages; a package is a bundle of
//! course modules. Only the parts the payment flow reads are modelled here.

use serde::{Deserialize, Serialize};

use super::SchoolId;

uuid_id!(
    /// Unique identifier for an offer
    OfferId
);
uuid_id!(
    /// Unique identifier for a package of modules
    PackageId
);
uuid_id!(
    /// Unique identifier for a course module
    ModuleId
);
uuid_id!(
    /// Unique identifier for a course
    CourseId
);

/// A purchasable bundle of course packages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub school_id: SchoolId,
    pub name: String,
    /// Price in minor currency units
    pub price: u64,
    pub currency: String,
    pub packages: Vec<PackageId>,
}

impl Offer {
    pub fn belongs_to(&self, school_id: &SchoolId) -> bool {
        self.school_id == *school_id
    }
}

/// A course module, reachable from an offer through its package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub course_id: CourseId,
    pub package_id: PackageId,
    pub name: String,
}
