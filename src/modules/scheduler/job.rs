use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::Result;
use crate::modules::installments::{ReminderDispatcher, SettlementEngine};

/// Batch entry point a trigger invokes. `today` is the business-calendar day
/// the trigger fired on.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, today: NaiveDate) -> Result<()>;
}

#[async_trait]
impl ScheduledJob for SettlementEngine {
    fn name(&self) -> &str {
        "settlement"
    }

    async fn run(&self, today: NaiveDate) -> Result<()> {
        self.process_scheduled_installments(today).await.map(|_| ())
    }
}

#[async_trait]
impl ScheduledJob for ReminderDispatcher {
    fn name(&self) -> &str {
        "payment_reminders"
    }

    async fn run(&self, today: NaiveDate) -> Result<()> {
        self.send_payment_reminders(today).await.map(|_| ())
    }
}
