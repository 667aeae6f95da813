//! Student domain entity
//!
//! Only the identity and entitlement parts of the student record are modelled.
//! Entitlements have set semantics: granting a module twice is a no-op.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::offer::{CourseId, Module, ModuleId};
use super::SchoolId;

uuid_id!(
    /// Unique identifier for a student
    StudentId
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
    pub available_modules: BTreeSet<ModuleId>,
    pub available_courses: BTreeSet<CourseId>,
}

impl Student {
    pub fn is_module_available(&self, module_id: &ModuleId) -> bool {
        self.available_modules.contains(module_id)
    }

    /// Union-add an entitlement. Returns true if anything changed.
    pub fn grant(&mut self, entitlement: &Entitlement) -> bool {
        let before = (self.available_modules.len(), self.available_courses.len());
        self.available_modules
            .extend(entitlement.modules.iter().copied());
        self.available_courses
            .extend(entitlement.courses.iter().copied());
        before != (self.available_modules.len(), self.available_courses.len())
    }

    /// Remove an entitlement. Returns true if anything changed.
    pub fn revoke(&mut self, entitlement: &Entitlement) -> bool {
        let before = (self.available_modules.len(), self.available_courses.len());
        self.available_modules
            .retain(|m| !entitlement.modules.contains(m));
        self.available_courses
            .retain(|c| !entitlement.courses.contains(c));
        before != (self.available_modules.len(), self.available_courses.len())
    }
}

/// Modules and owning courses unlocked by an offer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entitlement {
    pub modules: BTreeSet<ModuleId>,
    pub courses: BTreeSet<CourseId>,
}

impl Entitlement {
    /// Collect module ids and the distinct set of their owning courses
    pub fn from_modules(modules: &[Module]) -> Self {
        Self {
            modules: modules.iter().map(|m| m.id).collect(),
            courses: modules.iter().map(|m| m.course_id).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.courses.is_empty()
    }
}
