use std::sync::Arc;

use actix_web::web;

use crate::config::SchedulerConfig;
use crate::core::{BusinessClock, Result};
use crate::modules::health;
use crate::modules::installments::{ReminderDispatcher, SettlementEngine};
use crate::modules::notifications::{NotificationDispatcher, Notifier};
use crate::modules::orders::{self, OrderRepository, OrderService};
use crate::modules::payments::PaymentProvider;
use crate::modules::scheduler::DailyScheduler;

/// Wired service graph shared by the HTTP app and the scheduler
#[derive(Clone)]
pub struct AppServices {
    pub repo: Arc<dyn OrderRepository>,
    pub orders: Arc<OrderService>,
    pub settlement: Arc<SettlementEngine>,
    pub reminders: Arc<ReminderDispatcher>,
    pub notifications: Arc<NotificationDispatcher>,
    pub clock: BusinessClock,
}

impl AppServices {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        provider: Arc<dyn PaymentProvider>,
        notifier: Arc<dyn Notifier>,
        clock: BusinessClock,
        scheduler: &SchedulerConfig,
    ) -> Self {
        let notifications = Arc::new(NotificationDispatcher::new(notifier));

        Self {
            orders: Arc::new(OrderService::new(repo.clone(), clock)),
            settlement: Arc::new(
                SettlementEngine::new(repo.clone(), provider, notifications.clone())
                    .with_retry_offset_days(scheduler.retry_offset_days),
            ),
            reminders: Arc::new(
                ReminderDispatcher::new(repo.clone(), notifications.clone())
                    .with_lead_days(scheduler.reminder_lead_days),
            ),
            repo,
            notifications,
            clock,
        }
    }

    /// Settlement and reminder triggers for the configured times
    pub fn scheduler(&self, config: &SchedulerConfig) -> Result<DailyScheduler> {
        DailyScheduler::new(self.clock)
            .schedule(&config.settlement_cron, self.settlement.clone())?
            .schedule(&config.reminder_cron, self.reminders.clone())
    }

    /// Register app data and routes
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.repo.clone()))
            .app_data(web::Data::new(self.orders.clone()))
            .app_data(web::Data::new(self.settlement.clone()))
            .configure(health::controllers::configure)
            .configure(orders::controllers::configure);
    }
}
