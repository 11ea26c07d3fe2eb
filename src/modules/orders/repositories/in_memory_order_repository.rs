use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};

use super::order_repository::{prepare_for_write, OrderFilter, OrderRepository};
use crate::core::{AppError, Result};
use crate::modules::orders::models::Order;

/// Process-local order ledger.
///
/// Used when no database is configured and by the test suites. Each write
/// holds the map lock for the whole compare-and-swap, so `save` has the same
/// conditional-write semantics as the MySQL repository.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
    sequences: Mutex<HashMap<NaiveDate, u32>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, mut order: Order) -> Result<Order> {
        let mut orders = self.orders.write();

        if orders.contains_key(&order.id) {
            return Err(AppError::conflict(format!("Order {} already exists", order.id)));
        }
        if orders.values().any(|o| o.order_number == order.order_number) {
            return Err(AppError::conflict(format!(
                "Order number {} already assigned",
                order.order_number
            )));
        }

        let created_at = order.created_at;
        prepare_for_write(&mut order, created_at);
        order.version = 1;
        orders.insert(order.id.clone(), order.clone());

        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>> {
        Ok(self.orders.read().get(id).cloned())
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let mut matched: Vec<Order> = self
            .orders
            .read()
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();

        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matched)
    }

    async fn save(&self, mut order: Order) -> Result<Order> {
        let mut orders = self.orders.write();

        let stored = orders
            .get(&order.id)
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order.id)))?;

        if stored.version != order.version {
            return Err(AppError::conflict(format!(
                "Order {} was modified concurrently (expected version {}, found {})",
                order.id, order.version, stored.version
            )));
        }

        prepare_for_write(&mut order, Utc::now());
        order.version += 1;
        orders.insert(order.id.clone(), order.clone());

        Ok(order)
    }

    async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let count = self
            .orders
            .read()
            .values()
            .filter(|o| o.created_at >= start && o.created_at < end)
            .count();
        Ok(count as u64)
    }

    async fn reserve_order_sequence(&self, day: NaiveDate) -> Result<u32> {
        let mut sequences = self.sequences.lock();
        let next = sequences.entry(day).or_insert(0);
        *next += 1;
        Ok(*next)
    }
}
