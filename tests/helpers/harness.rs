use std::sync::Arc;

use storefront::config::SchedulerConfig;
use storefront::core::BusinessClock;
use storefront::orders::{InMemoryOrderRepository, OrderRepository};
use storefront::AppServices;

use super::doubles::{RecordingNotifier, ScriptedProvider};

pub fn scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        settlement_cron: "0 2 * * *".to_string(),
        reminder_cron: "0 9 * * *".to_string(),
        retry_offset_days: 3,
        reminder_lead_days: 3,
    }
}

/// Fully wired services over test doubles
pub struct Harness {
    pub services: AppServices,
    pub provider: Arc<ScriptedProvider>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_repo(Arc::new(InMemoryOrderRepository::new()))
    }

    pub fn with_repo(repo: Arc<dyn OrderRepository>) -> Self {
        Self::build(repo, Arc::new(RecordingNotifier::new()), BusinessClock::utc())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        Self::build(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(notifier),
            BusinessClock::utc(),
        )
    }

    pub fn with_clock(clock: BusinessClock) -> Self {
        Self::build(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(RecordingNotifier::new()),
            clock,
        )
    }

    fn build(
        repo: Arc<dyn OrderRepository>,
        notifier: Arc<RecordingNotifier>,
        clock: BusinessClock,
    ) -> Self {
        let provider = Arc::new(ScriptedProvider::new());
        let services = AppServices::new(
            repo,
            provider.clone(),
            notifier.clone(),
            clock,
            &scheduler_config(),
        );

        Self {
            services,
            provider,
            notifier,
        }
    }

    /// Wait for queued notifications
    pub async fn flush(&self) -> usize {
        self.services.notifications.flush().await
    }
}
