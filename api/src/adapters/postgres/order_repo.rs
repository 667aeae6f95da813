//! PostgreSQL adapter for OrderRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::entities::{
    NewOrder, OfferId, OfferSnapshot, Order, OrderFilter, OrderId, OrderPage, OrderStatus,
    PromoSnapshot, PromocodeId, SchoolId, StudentId, StudentSnapshot, Transaction,
};
use crate::domain::ports::OrderRepository;
use crate::entity::{order_transactions, orders};
use crate::error::DomainError;

/// PostgreSQL implementation of OrderRepository
pub struct PostgresOrderRepository {
    db: DatabaseConnection,
}

impl PostgresOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Load an order and its transactions in append order
async fn load_order<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<Order>, DomainError> {
    let Some(model) = orders::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
    else {
        return Ok(None);
    };

    let transactions = order_transactions::Entity::find()
        .filter(order_transactions::Column::OrderId.eq(id))
        .order_by_asc(order_transactions::Column::Seq)
        .all(conn)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

    Ok(Some(to_order(model, transactions)))
}

/// Pattern for a case-insensitive substring match
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn search_condition(term: &str) -> Condition {
    let pattern = contains_pattern(term);
    [
        orders::Column::StudentName,
        orders::Column::StudentEmail,
        orders::Column::OfferName,
        orders::Column::PromocodeCode,
    ]
    .into_iter()
    .fold(Condition::any(), |cond, column| {
        cond.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()))
    })
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            school_id: Set(order.school_id.0),
            student_id: Set(order.student.id.0),
            student_name: Set(order.student.name.clone()),
            student_email: Set(order.student.email.clone()),
            offer_id: Set(order.offer.id.0),
            offer_name: Set(order.offer.name.clone()),
            promocode_id: Set(order.promo.as_ref().map(|p| p.id.0)),
            promocode_code: Set(order.promo.as_ref().map(|p| p.code.clone())),
            amount: Set(order.amount as i64),
            currency: Set(order.currency.clone()),
            status: Set(OrderStatus::Created.to_string()),
            created_at: Set(now),
            confirmation_sent_at: Set(None),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(to_order(result, vec![]))
    }

    async fn add_transaction(
        &self,
        id: &OrderId,
        transaction: &Transaction,
    ) -> Result<Order, DomainError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        // Row lock on the order serializes concurrent deliveries
        let updated = orders::Entity::update_many()
            .col_expr(
                orders::Column::Status,
                Expr::value(transaction.status.to_string()),
            )
            .filter(orders::Column::Id.eq(id.0))
            .exec(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if updated.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Order {} not found", id)));
        }

        order_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(id.0),
            status: Set(transaction.status.to_string()),
            raw_payload: Set(transaction.raw_payload.clone()),
            created_at: Set(transaction.created_at.fixed_offset()),
            seq: NotSet,
        }
        .insert(&txn)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        let order = load_order(&txn, id.0)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Order {} not found", id)))?;

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(order)
    }

    async fn claim_confirmation(&self, id: &OrderId) -> Result<bool, DomainError> {
        let claimed = orders::Entity::update_many()
            .col_expr(
                orders::Column::ConfirmationSentAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(orders::Column::Id.eq(id.0))
            .filter(orders::Column::ConfirmationSentAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if claimed.rows_affected == 1 {
            return Ok(true);
        }

        let exists = orders::Entity::find_by_id(id.0)
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if exists == 0 {
            return Err(DomainError::NotFound(format!("Order {} not found", id)));
        }
        Ok(false)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        load_order(&self.db, id.0).await
    }

    async fn find_by_school(
        &self,
        school_id: &SchoolId,
        filter: &OrderFilter,
    ) -> Result<OrderPage, DomainError> {
        let mut query = orders::Entity::find().filter(orders::Column::SchoolId.eq(school_id.0));

        if let Some(term) = filter.search.as_deref() {
            query = query.filter(search_condition(term));
        }
        if let Some(status) = filter.status {
            query = query.filter(orders::Column::Status.eq(status.to_string()));
        }
        if let Some(from) = filter.created_from {
            query = query.filter(orders::Column::CreatedAt.gte(from.fixed_offset()));
        }
        if let Some(to) = filter.created_to {
            query = query.filter(orders::Column::CreatedAt.lte(to.fixed_offset()));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let models = query
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .offset(filter.offset())
            .limit(filter.limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut history: HashMap<Uuid, Vec<order_transactions::Model>> = HashMap::new();
        if !ids.is_empty() {
            let transactions = order_transactions::Entity::find()
                .filter(order_transactions::Column::OrderId.is_in(ids))
                .order_by_asc(order_transactions::Column::Seq)
                .all(&self.db)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
            for t in transactions {
                history.entry(t.order_id).or_default().push(t);
            }
        }

        let items = models
            .into_iter()
            .map(|m| {
                let transactions = history.remove(&m.id).unwrap_or_default();
                to_order(m, transactions)
            })
            .collect();

        Ok(OrderPage {
            items,
            total,
            page: filter.page,
            limit: filter.limit,
        })
    }
}

/// Convert SeaORM models to the domain order
fn to_order(model: orders::Model, transactions: Vec<order_transactions::Model>) -> Order {
    let promo = match (model.promocode_id, model.promocode_code) {
        (Some(id), Some(code)) => Some(PromoSnapshot {
            id: PromocodeId(id),
            code,
        }),
        _ => None,
    };

    Order {
        id: OrderId(model.id),
        school_id: SchoolId(model.school_id),
        student: StudentSnapshot {
            id: StudentId(model.student_id),
            name: model.student_name,
            email: model.student_email,
        },
        offer: OfferSnapshot {
            id: OfferId(model.offer_id),
            name: model.offer_name,
        },
        promo,
        amount: model.amount.max(0) as u64,
        currency: model.currency,
        status: model.status.parse().unwrap_or(OrderStatus::Other),
        created_at: model.created_at.with_timezone(&Utc),
        transactions: transactions.into_iter().map(|t| t.into()).collect(),
    }
}

impl From<order_transactions::Model> for Transaction {
    fn from(model: order_transactions::Model) -> Self {
        Transaction {
            status: model.status.parse().unwrap_or(OrderStatus::Other),
            created_at: model.created_at.with_timezone(&Utc),
            raw_payload: model.raw_payload,
        }
    }
}
