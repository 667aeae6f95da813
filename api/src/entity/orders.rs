use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub student_name: String,
    #[sea_orm(column_type = "Text")]
    pub student_email: String,
    pub offer_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub offer_name: String,
    pub promocode_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub promocode_code: Option<String>,
    pub amount: i64,
    #[sea_orm(column_type = "Text")]
    pub currency: String,
    #[sea_orm(column_type = "Text")]
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub confirmation_sent_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_transactions::Entity")]
    OrderTransactions,
}

impl Related<super::order_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
