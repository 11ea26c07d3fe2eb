// MySQL-backed order ledger.
//
// Each order is one row: the whole order serialized into `document`, plus the
// columns the due/reminder queries and the conditional update need. The
// `version` column is authoritative; the copy inside the document is
// overwritten on read.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use super::order_repository::{prepare_for_write, OrderFilter, OrderRepository};
use crate::core::{AppError, Result};
use crate::modules::installments::models::PlanType;
use crate::modules::orders::models::Order;

/// Repository for order ledger database operations
pub struct MySqlOrderRepository {
    pool: MySqlPool,
}

impl MySqlOrderRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations from `./migrations`
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Configuration(format!("Failed to run migrations: {}", e)))
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    document: Json<Order>,
    version: u64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        let mut order = row.document.0;
        order.version = row.version;
        order
    }
}

/// Column projections of an order
struct Projection<'a> {
    status: &'static str,
    plan_type: &'static str,
    next_installment_date: Option<NaiveDate>,
    installments_paid: u32,
    order: &'a Order,
}

impl<'a> Projection<'a> {
    fn of(order: &'a Order) -> Self {
        let plan = order.payment_plan.as_ref();
        Self {
            status: order.status.as_str(),
            plan_type: plan.map(|p| p.plan_type).unwrap_or(PlanType::Full).as_str(),
            next_installment_date: plan.and_then(|p| p.next_installment_date),
            installments_paid: plan.map(|p| p.installments_paid).unwrap_or(0),
            order,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl OrderRepository for MySqlOrderRepository {
    async fn insert(&self, mut order: Order) -> Result<Order> {
        let created_at = order.created_at;
        prepare_for_write(&mut order, created_at);
        order.version = 1;

        let p = Projection::of(&order);
        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, owner_ref, status, plan_type,
                next_installment_date, installments_paid, version,
                created_at, updated_at, document
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&p.order.id)
        .bind(&p.order.order_number)
        .bind(&p.order.owner_ref)
        .bind(p.status)
        .bind(p.plan_type)
        .bind(p.next_installment_date)
        .bind(p.installments_paid)
        .bind(p.order.version)
        .bind(p.order.created_at)
        .bind(p.order.updated_at)
        .bind(Json(p.order))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(order),
            Err(e) if is_unique_violation(&e) => Err(AppError::conflict(format!(
                "Order {} or order number {} already exists",
                order.id, order.order_number
            ))),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT document, version
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let mut query: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT document, version FROM orders WHERE 1 = 1");

        if let Some(plan_type) = filter.plan_type {
            query.push(" AND plan_type = ").push_bind(plan_type.as_str());
        }
        if let Some(from) = filter.next_installment_from {
            query.push(" AND next_installment_date >= ").push_bind(from);
        }
        if let Some(to) = filter.next_installment_to {
            query.push(" AND next_installment_date <= ").push_bind(to);
        }
        if !filter.statuses.is_empty() {
            query.push(" AND status IN (");
            let mut statuses = query.separated(", ");
            for status in &filter.statuses {
                statuses.push_bind(status.as_str());
            }
            statuses.push_unseparated(")");
        }
        if let Some(owner_ref) = &filter.owner_ref {
            query.push(" AND owner_ref = ").push_bind(owner_ref.clone());
        }
        query.push(" ORDER BY created_at ASC, id ASC");

        let rows = query
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn save(&self, mut order: Order) -> Result<Order> {
        let expected_version = order.version;
        prepare_for_write(&mut order, Utc::now());
        order.version = expected_version + 1;

        let p = Projection::of(&order);
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?, plan_type = ?, next_installment_date = ?,
                installments_paid = ?, version = ?, updated_at = ?, document = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(p.status)
        .bind(p.plan_type)
        .bind(p.next_installment_date)
        .bind(p.installments_paid)
        .bind(p.order.version)
        .bind(p.order.updated_at)
        .bind(Json(p.order))
        .bind(&p.order.id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(order);
        }

        let stored: Option<u64> = sqlx::query_scalar("SELECT version FROM orders WHERE id = ?")
            .bind(&order.id)
            .fetch_optional(&self.pool)
            .await?;

        match stored {
            None => Err(AppError::not_found(format!("Order {} not found", order.id))),
            Some(found) => Err(AppError::conflict(format!(
                "Order {} was modified concurrently (expected version {}, found {})",
                order.id, expected_version, found
            ))),
        }
    }

    async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE created_at >= ? AND created_at < ?",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn reserve_order_sequence(&self, day: NaiveDate) -> Result<u32> {
        let mut tx = self.pool.begin().await?;

        // The upsert takes the row lock, so the read below sees our own increment
        sqlx::query(
            r#"
            INSERT INTO order_sequences (sequence_date, last_value)
            VALUES (?, 1)
            ON DUPLICATE KEY UPDATE last_value = last_value + 1
            "#,
        )
        .bind(day)
        .execute(&mut *tx)
        .await?;

        let value: u32 =
            sqlx::query_scalar("SELECT last_value FROM order_sequences WHERE sequence_date = ?")
                .bind(day)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(value)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
