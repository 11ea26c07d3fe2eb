use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::core::{BusinessClock, Result};
use crate::modules::orders::repositories::OrderRepository;

/// `ORD-YYYYMMDD-NNN`; sequences past 999 keep their natural width
pub fn format_order_number(day: NaiveDate, sequence: u32) -> String {
    format!("ORD-{}-{:03}", day.format("%Y%m%d"), sequence)
}

/// Assigns per-day order numbers.
///
/// The sequence comes from the repository's atomic per-day counter, so two
/// checkouts racing on the same day never receive the same number.
pub struct OrderNumberGenerator {
    repo: Arc<dyn OrderRepository>,
    clock: BusinessClock,
}

impl OrderNumberGenerator {
    pub fn new(repo: Arc<dyn OrderRepository>, clock: BusinessClock) -> Self {
        Self { repo, clock }
    }

    /// Reserve the next number for the business day `now` falls on
    pub async fn next(&self, now: DateTime<Utc>) -> Result<String> {
        let day = self.clock.local_date(now);
        let sequence = self.repo.reserve_order_sequence(day).await?;
        let number = format_order_number(day, sequence);

        debug!(order_number = %number, "Reserved order number");
        Ok(number)
    }
}
