use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::core::Result;
use crate::modules::installments::models::PlanType;
use crate::modules::orders::models::{Order, OrderStatus};
use crate::modules::orders::services::payment_state::apply_payment_state;

/// Document-store view of the order ledger.
///
/// Writes are single-document and optimistic: `save` only succeeds when the
/// stored `version` still equals the version the caller read, and both `insert`
/// and `save` recompute the payment-derived fields before writing.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store a new order. Fails if the id or order number already exists.
    async fn insert(&self, order: Order) -> Result<Order>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>>;

    /// Orders matching `filter`, oldest first
    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>>;

    /// Conditional replace keyed on `order.version`.
    ///
    /// Returns the stored order with its bumped version, `AppError::Conflict`
    /// if another writer got there first, `AppError::NotFound` if the order
    /// does not exist.
    async fn save(&self, order: Order) -> Result<Order>;

    /// Orders created in `[start, end)`
    async fn count_created_between(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Result<u64>;

    /// Atomically reserve the next order-number sequence for `day` (1-based)
    async fn reserve_order_sequence(&self, day: NaiveDate) -> Result<u32>;

    /// Backend liveness check for readiness probes
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Recompute derived fields and stamp the write time. Every persist path runs this.
pub fn prepare_for_write(order: &mut Order, now: DateTime<Utc>) {
    apply_payment_state(order);
    order.updated_at = now;
}

/// Query-by-filter criteria. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub plan_type: Option<PlanType>,
    /// Inclusive lower bound on `payment_plan.next_installment_date`
    pub next_installment_from: Option<NaiveDate>,
    /// Inclusive upper bound on `payment_plan.next_installment_date`
    pub next_installment_to: Option<NaiveDate>,
    /// Empty matches any status
    pub statuses: Vec<OrderStatus>,
    pub owner_ref: Option<String>,
}

impl OrderFilter {
    /// Installment orders awaiting payment whose next charge is on or before `today`
    pub fn due_installments(today: NaiveDate) -> Self {
        Self {
            plan_type: Some(PlanType::Installment),
            next_installment_from: None,
            next_installment_to: Some(today),
            statuses: OrderStatus::awaiting_payment().to_vec(),
            owner_ref: None,
        }
    }

    /// Installment orders awaiting payment whose next charge falls on `day`
    pub fn installments_due_on(day: NaiveDate) -> Self {
        Self {
            plan_type: Some(PlanType::Installment),
            next_installment_from: Some(day),
            next_installment_to: Some(day),
            statuses: OrderStatus::awaiting_payment().to_vec(),
            owner_ref: None,
        }
    }

    pub fn for_owner(owner_ref: impl Into<String>) -> Self {
        Self {
            owner_ref: Some(owner_ref.into()),
            ..Default::default()
        }
    }

    fn has_date_bound(&self) -> bool {
        self.next_installment_from.is_some() || self.next_installment_to.is_some()
    }

    /// In-process evaluation of the filter
    pub fn matches(&self, order: &Order) -> bool {
        let plan_type = order
            .payment_plan
            .as_ref()
            .map(|p| p.plan_type)
            .unwrap_or(PlanType::Full);

        if self.plan_type.is_some_and(|t| t != plan_type) {
            return false;
        }

        if !self.statuses.is_empty() && !self.statuses.contains(&order.status) {
            return false;
        }

        if let Some(owner) = &self.owner_ref {
            if owner != &order.owner_ref {
                return false;
            }
        }

        if self.has_date_bound() {
            let Some(next) = order
                .payment_plan
                .as_ref()
                .and_then(|p| p.next_installment_date)
            else {
                return false;
            };

            if self.next_installment_from.is_some_and(|from| next < from) {
                return false;
            }
            if self.next_installment_to.is_some_and(|to| next > to) {
                return false;
            }
        }

        true
    }
}
