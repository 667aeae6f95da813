use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub school_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub price: i64,
    #[sea_orm(column_type = "Text")]
    pub currency: String,
    /// JSON array of package ids
    #[sea_orm(column_type = "JsonBinary")]
    pub package_ids: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
