use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "promocodes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub school_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub code: String,
    pub discount: i16,
    pub expires_at: DateTimeWithTimeZone,
    /// JSON array of offer ids
    #[sea_orm(column_type = "JsonBinary")]
    pub offer_ids: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
