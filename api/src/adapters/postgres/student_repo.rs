//! PostgreSQL adapter for StudentRepository
//!
//! Entitlements live in `student_modules` / `student_courses` keyed by
//! (student, item), so grants are set unions via `ON CONFLICT DO NOTHING`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};

use crate::domain::entities::{CourseId, Entitlement, ModuleId, SchoolId, Student, StudentId};
use crate::domain::ports::StudentRepository;
use crate::entity::{student_courses, student_modules, students};
use crate::error::DomainError;

/// PostgreSQL implementation of StudentRepository
pub struct PostgresStudentRepository {
    db: DatabaseConnection,
}

impl PostgresStudentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_exists(&self, id: &StudentId) -> Result<(), DomainError> {
        let found = students::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        match found {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound(format!("Student {} not found", id))),
        }
    }
}

#[async_trait]
impl StudentRepository for PostgresStudentRepository {
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, DomainError> {
        let Some(model) = students::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let modules = student_modules::Entity::find()
            .filter(student_modules::Column::StudentId.eq(id.0))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let courses = student_courses::Entity::find()
            .filter(student_courses::Column::StudentId.eq(id.0))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(Some(Student {
            id: StudentId(model.id),
            school_id: SchoolId(model.school_id),
            name: model.name,
            email: model.email,
            available_modules: modules.into_iter().map(|m| ModuleId(m.module_id)).collect(),
            available_courses: courses.into_iter().map(|c| CourseId(c.course_id)).collect(),
        }))
    }

    async fn grant_access(
        &self,
        id: &StudentId,
        entitlement: &Entitlement,
    ) -> Result<(), DomainError> {
        self.ensure_exists(id).await?;
        if entitlement.is_empty() {
            return Ok(());
        }

        let now = Utc::now().fixed_offset();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if !entitlement.modules.is_empty() {
            let rows = entitlement
                .modules
                .iter()
                .map(|m| student_modules::ActiveModel {
                    student_id: Set(id.0),
                    module_id: Set(m.0),
                    granted_at: Set(now),
                });
            student_modules::Entity::insert_many(rows)
                .on_conflict(
                    OnConflict::columns([
                        student_modules::Column::StudentId,
                        student_modules::Column::ModuleId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
        }

        if !entitlement.courses.is_empty() {
            let rows = entitlement
                .courses
                .iter()
                .map(|c| student_courses::ActiveModel {
                    student_id: Set(id.0),
                    course_id: Set(c.0),
                    granted_at: Set(now),
                });
            student_courses::Entity::insert_many(rows)
                .on_conflict(
                    OnConflict::columns([
                        student_courses::Column::StudentId,
                        student_courses::Column::CourseId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn revoke_access(
        &self,
        id: &StudentId,
        entitlement: &Entitlement,
    ) -> Result<(), DomainError> {
        self.ensure_exists(id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if !entitlement.modules.is_empty() {
            student_modules::Entity::delete_many()
                .filter(student_modules::Column::StudentId.eq(id.0))
                .filter(
                    student_modules::Column::ModuleId
                        .is_in(entitlement.modules.iter().map(|m| m.0)),
                )
                .exec(&txn)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
        }

        if !entitlement.courses.is_empty() {
            student_courses::Entity::delete_many()
                .filter(student_courses::Column::StudentId.eq(id.0))
                .filter(
                    student_courses::Column::CourseId
                        .is_in(entitlement.courses.iter().map(|c| c.0)),
                )
                .exec(&txn)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }
}
