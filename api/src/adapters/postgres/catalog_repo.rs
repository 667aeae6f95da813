//! PostgreSQL adapters for the read-only catalog: offers, modules, promocodes

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::entities::{
    CourseId, Module, ModuleId, Offer, OfferId, PackageId, Promocode, PromocodeId, SchoolId,
};
use crate::domain::ports::{ModuleRepository, OfferRepository, PromocodeRepository};
use crate::entity::{modules, offers, promocodes};
use crate::error::DomainError;

/// PostgreSQL implementation of OfferRepository
pub struct PostgresOfferRepository {
    db: DatabaseConnection,
}

impl PostgresOfferRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OfferRepository for PostgresOfferRepository {
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, DomainError> {
        let result = offers::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(Offer::try_from).transpose()
    }
}

/// PostgreSQL implementation of ModuleRepository
pub struct PostgresModuleRepository {
    db: DatabaseConnection,
}

impl PostgresModuleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ModuleRepository for PostgresModuleRepository {
    async fn find_by_packages(&self, packages: &[PackageId]) -> Result<Vec<Module>, DomainError> {
        if packages.is_empty() {
            return Ok(vec![]);
        }

        let results = modules::Entity::find()
            .filter(modules::Column::PackageId.is_in(packages.iter().map(|p| p.0)))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }
}

/// PostgreSQL implementation of PromocodeRepository
pub struct PostgresPromocodeRepository {
    db: DatabaseConnection,
}

impl PostgresPromocodeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PromocodeRepository for PostgresPromocodeRepository {
    async fn find_by_id(&self, id: &PromocodeId) -> Result<Option<Promocode>, DomainError> {
        let result = promocodes::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(Promocode::try_from).transpose()
    }
}

/// Decode a JSONB id list column
fn id_list<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    column: &str,
) -> Result<Vec<T>, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Database(format!("malformed {}: {}", column, e)))
}

impl TryFrom<offers::Model> for Offer {
    type Error = DomainError;

    fn try_from(model: offers::Model) -> Result<Self, Self::Error> {
        Ok(Offer {
            id: OfferId(model.id),
            school_id: SchoolId(model.school_id),
            name: model.name,
            price: model.price.max(0) as u64,
            currency: model.currency,
            packages: id_list(model.package_ids, "offers.package_ids")?,
        })
    }
}

impl From<modules::Model> for Module {
    fn from(model: modules::Model) -> Self {
        Module {
            id: ModuleId(model.id),
            course_id: CourseId(model.course_id),
            package_id: PackageId(model.package_id),
            name: model.name,
        }
    }
}

impl TryFrom<promocodes::Model> for Promocode {
    type Error = DomainError;

    fn try_from(model: promocodes::Model) -> Result<Self, Self::Error> {
        Ok(Promocode {
            id: PromocodeId(model.id),
            school_id: SchoolId(model.school_id),
            code: model.code,
            discount: model.discount.clamp(0, 100) as u8,
            expires_at: model.expires_at.with_timezone(&chrono::Utc),
            offers: id_list(model.offer_ids, "promocodes.offer_ids")?,
        })
    }
}
