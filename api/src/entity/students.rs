use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub school_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub email: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::student_modules::Entity")]
    StudentModules,
    #[sea_orm(has_many = "super::student_courses::Entity")]
    StudentCourses,
}

impl Related<super::student_modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentModules.def()
    }
}

impl Related<super::student_courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentCourses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
