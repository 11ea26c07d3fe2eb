use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{debug, info};

use crate::core::{AppError, Result};
use crate::modules::installments::models::ReminderReport;
use crate::modules::notifications::{templates, NotificationDispatcher};
use crate::modules::orders::repositories::{OrderFilter, OrderRepository};

pub const DEFAULT_REMINDER_LEAD_DAYS: u32 = 3;

/// Sends advance notice of upcoming installment charges. Never writes to
/// the ledger.
pub struct ReminderDispatcher {
    repo: Arc<dyn OrderRepository>,
    notifications: Arc<NotificationDispatcher>,
    lead_days: u32,
}

impl ReminderDispatcher {
    pub fn new(repo: Arc<dyn OrderRepository>, notifications: Arc<NotificationDispatcher>) -> Self {
        Self {
            repo,
            notifications,
            lead_days: DEFAULT_REMINDER_LEAD_DAYS,
        }
    }

    pub fn with_lead_days(mut self, days: u32) -> Self {
        self.lead_days = days;
        self
    }

    /// Remind every customer whose next installment falls exactly
    /// `lead_days` after `today`
    pub async fn send_payment_reminders(&self, today: NaiveDate) -> Result<ReminderReport> {
        let due_date = today
            .checked_add_days(Days::new(u64::from(self.lead_days)))
            .ok_or_else(|| AppError::internal("Reminder date out of range"))?;

        let orders = self
            .repo
            .find(&OrderFilter::installments_due_on(due_date))
            .await?;

        let mut report = ReminderReport {
            due_date: Some(due_date),
            matched: orders.len(),
            ..Default::default()
        };

        for order in &orders {
            let Some(plan) = order.installment_plan() else {
                continue;
            };
            if plan.is_complete() {
                continue;
            }

            let amount = plan.next_charge_amount(order.total);
            self.notifications
                .emit(templates::payment_reminder(order, amount, due_date));

            debug!(order_id = %order.id, due_date = %due_date, "Payment reminder queued");
            report.dispatched += 1;
            report.reminded_order_ids.push(order.id.clone());
        }

        info!(
            due_date = %due_date,
            matched = report.matched,
            dispatched = report.dispatched,
            "Payment reminders dispatched"
        );

        Ok(report)
    }
}
