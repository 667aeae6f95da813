//! Access handlers
//!
//! Manual entitlement grants/revocations and the module availability check.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{Entitlement, ModuleId, OfferId, StudentId};
use crate::error::AppError;
use crate::AppState;

/// What a grant or revoke covered
#[derive(Debug, Serialize)]
pub struct AccessChangeResponse {
    pub student_id: String,
    pub offer_id: String,
    pub modules: Vec<String>,
    pub courses: Vec<String>,
}

impl AccessChangeResponse {
    fn new(student_id: StudentId, offer_id: OfferId, entitlement: Entitlement) -> Self {
        Self {
            student_id: student_id.to_string(),
            offer_id: offer_id.to_string(),
            modules: entitlement.modules.iter().map(|m| m.to_string()).collect(),
            courses: entitlement.courses.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleAvailabilityResponse {
    pub available: bool,
}

/// POST /students/:student_id/offers/:offer_id/access
pub async fn grant_offer_access(
    State(state): State<AppState>,
    Path((student_id, offer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AccessChangeResponse>, AppError> {
    let (student_id, offer_id) = (StudentId(student_id), OfferId(offer_id));
    let entitlement = state
        .access_service
        .give_access_to_offer(&student_id, &offer_id)
        .await?;
    Ok(Json(AccessChangeResponse::new(student_id, offer_id, entitlement)))
}

/// DELETE /students/:student_id/offers/:offer_id/access
pub async fn revoke_offer_access(
    State(state): State<AppState>,
    Path((student_id, offer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AccessChangeResponse>, AppError> {
    let (student_id, offer_id) = (StudentId(student_id), OfferId(offer_id));
    let entitlement = state
        .access_service
        .remove_access_to_offer(&student_id, &offer_id)
        .await?;
    Ok(Json(AccessChangeResponse::new(student_id, offer_id, entitlement)))
}

/// GET /students/:student_id/modules/:module_id/access
pub async fn module_access(
    State(state): State<AppState>,
    Path((student_id, module_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ModuleAvailabilityResponse>, AppError> {
    let available = state
        .access_service
        .is_module_available(&StudentId(student_id), &ModuleId(module_id))
        .await?;
    Ok(Json(ModuleAvailabilityResponse { available }))
}
