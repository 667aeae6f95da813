//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use std::collections::BTreeSet;

use chrono::{Duration, Utc};

use crate::domain::entities::{
    CourseId, Module, ModuleId, NewOrder, Offer, OfferId, OfferSnapshot, PackageId, Promocode,
    PromocodeId, SchoolId, Student, StudentId, StudentSnapshot,
};

/// An offer together with the modules it unlocks
#[derive(Debug, Clone)]
pub struct TestCatalog {
    pub offer: Offer,
    /// Three modules across two packages and two courses
    pub modules: Vec<Module>,
    /// A module in a package the offer does not include
    pub unrelated_module: Module,
}

/// Create a student with empty entitlements
pub fn test_student(school_id: SchoolId) -> Student {
    Student {
        id: StudentId::new(),
        school_id,
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        available_modules: BTreeSet::new(),
        available_courses: BTreeSet::new(),
    }
}

fn test_module(package_id: PackageId, course_id: CourseId, name: &str) -> Module {
    Module {
        id: ModuleId::new(),
        course_id,
        package_id,
        name: name.to_string(),
    }
}

/// Create a 6900 USD offer over two packages
pub fn test_catalog() -> TestCatalog {
    let school_id = SchoolId::new();
    let basics = PackageId::new();
    let advanced = PackageId::new();
    let rust_course = CourseId::new();
    let async_course = CourseId::new();

    let offer = Offer {
        id: OfferId::new(),
        school_id,
        name: "Rust Bootcamp".to_string(),
        price: 6900,
        currency: "USD".to_string(),
        packages: vec![basics, advanced],
    };

    TestCatalog {
        offer,
        modules: vec![
            test_module(basics, rust_course, "Ownership"),
            test_module(basics, rust_course, "Traits"),
            test_module(advanced, async_course, "Futures"),
        ],
        unrelated_module: test_module(PackageId::new(), CourseId::new(), "Embedded"),
    }
}

/// Create the "GOGOGO25"-style promocode for an offer
pub fn test_promocode(offer: &Offer, discount: u8, expires_in: Duration) -> Promocode {
    Promocode {
        id: PromocodeId::new(),
        school_id: offer.school_id,
        code: "GOGOGO25".to_string(),
        discount,
        expires_at: Utc::now() + expires_in,
        offers: vec![offer.id],
    }
}

/// Order creation data for a student buying an offer at full price
pub fn test_new_order(student: &Student, offer: &Offer) -> NewOrder {
    NewOrder {
        school_id: offer.school_id,
        student: StudentSnapshot::from(student),
        offer: OfferSnapshot::from(offer),
        promo: None,
        amount: offer.price,
        currency: offer.currency.clone(),
    }
}
