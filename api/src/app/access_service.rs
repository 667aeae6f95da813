//! Access grant engine
//!
//! Resolves what an offer unlocks (offer → packages → modules → owning courses)
//! and applies it to a student's entitlement sets. Grants are set unions, so
//! repeating one after it succeeded changes nothing.

use std::sync::Arc;

use crate::domain::entities::{Entitlement, ModuleId, Offer, OfferId, StudentId};
use crate::domain::ports::{ModuleRepository, OfferRepository, StudentRepository};
use crate::error::AppError;

pub struct AccessService<SR, FR, MR>
where
    SR: StudentRepository,
    FR: OfferRepository,
    MR: ModuleRepository,
{
    students: Arc<SR>,
    offers: Arc<FR>,
    modules: Arc<MR>,
}

impl<SR, FR, MR> AccessService<SR, FR, MR>
where
    SR: StudentRepository,
    FR: OfferRepository,
    MR: ModuleRepository,
{
    pub fn new(students: Arc<SR>, offers: Arc<FR>, modules: Arc<MR>) -> Self {
        Self {
            students,
            offers,
            modules,
        }
    }

    async fn find_offer(&self, offer_id: &OfferId) -> Result<Offer, AppError> {
        self.offers
            .find_by_id(offer_id)
            .await?
            .ok_or_else(|| AppError::OfferNotFound(offer_id.to_string()))
    }

    /// Modules and courses an offer unlocks
    pub async fn entitlement_for(&self, offer: &Offer) -> Result<Entitlement, AppError> {
        if offer.packages.is_empty() {
            return Ok(Entitlement::default());
        }
        let modules = self.modules.find_by_packages(&offer.packages).await?;
        Ok(Entitlement::from_modules(&modules))
    }

    /// Union-add everything the offer unlocks into the student's entitlements
    pub async fn give_access_to_offer(
        &self,
        student_id: &StudentId,
        offer_id: &OfferId,
    ) -> Result<Entitlement, AppError> {
        let offer = self.find_offer(offer_id).await?;
        let entitlement = self.entitlement_for(&offer).await?;

        if entitlement.is_empty() {
            tracing::warn!(offer_id = %offer.id, "Offer unlocks no modules");
            return Ok(entitlement);
        }

        self.students.grant_access(student_id, &entitlement).await?;

        tracing::info!(
            student_id = %student_id,
            offer_id = %offer.id,
            modules = entitlement.modules.len(),
            courses = entitlement.courses.len(),
            "Access granted"
        );

        Ok(entitlement)
    }

    /// Remove everything the offer unlocks from the student's entitlements
    pub async fn remove_access_to_offer(
        &self,
        student_id: &StudentId,
        offer_id: &OfferId,
    ) -> Result<Entitlement, AppError> {
        let offer = self.find_offer(offer_id).await?;
        let entitlement = self.entitlement_for(&offer).await?;

        if !entitlement.is_empty() {
            self.students.revoke_access(student_id, &entitlement).await?;
        }

        tracing::info!(
            student_id = %student_id,
            offer_id = %offer.id,
            modules = entitlement.modules.len(),
            "Access revoked"
        );

        Ok(entitlement)
    }

    pub async fn is_module_available(
        &self,
        student_id: &StudentId,
        module_id: &ModuleId,
    ) -> Result<bool, AppError> {
        let student = self
            .students
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student {}", student_id)))?;

        Ok(student.is_module_available(module_id))
    }
}
