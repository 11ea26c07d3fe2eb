use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::job::ScheduledJob;
use crate::core::{AppError, BusinessClock, Result};

/// Parse a 5-field (`min hour dom mon dow`) or 6-field (leading seconds)
/// cron expression
pub fn parse_schedule(expression: &str) -> Result<Schedule> {
    let expression = expression.trim();
    let with_seconds = if expression.split_whitespace().count() == 5 {
        format!("0 {}", expression)
    } else {
        expression.to_string()
    };

    Schedule::from_str(&with_seconds).map_err(|e| {
        AppError::Configuration(format!("Invalid cron expression '{}': {}", expression, e))
    })
}

struct Trigger {
    expression: String,
    schedule: Schedule,
    job: Arc<dyn ScheduledJob>,
}

/// Fixed time-of-day triggers.
///
/// Every trigger runs on its own task and every invocation on a task of its
/// own, so a job that fails or panics never delays another trigger or its
/// own next firing.
pub struct DailyScheduler {
    clock: BusinessClock,
    triggers: Vec<Trigger>,
}

impl DailyScheduler {
    pub fn new(clock: BusinessClock) -> Self {
        Self {
            clock,
            triggers: Vec::new(),
        }
    }

    /// Register `job` to run whenever `expression` fires in the business timezone
    pub fn schedule(mut self, expression: &str, job: Arc<dyn ScheduledJob>) -> Result<Self> {
        let schedule = parse_schedule(expression)?;
        self.triggers.push(Trigger {
            expression: expression.trim().to_string(),
            schedule,
            job,
        });
        Ok(self)
    }

    /// Next firing of every trigger after `now`, in registration order
    pub fn next_runs(&self, now: DateTime<Utc>) -> Vec<(String, Option<DateTime<FixedOffset>>)> {
        let local = now.with_timezone(&self.clock.offset());
        self.triggers
            .iter()
            .map(|t| (t.job.name().to_string(), t.schedule.after(&local).next()))
            .collect()
    }

    /// Spawn one task per trigger. Abort the handles to stop scheduling.
    pub fn start(self) -> Vec<JoinHandle<()>> {
        let clock = self.clock;
        self.triggers
            .into_iter()
            .map(|trigger| tokio::spawn(run_trigger(clock, trigger)))
            .collect()
    }
}

async fn run_trigger(clock: BusinessClock, trigger: Trigger) {
    let name = trigger.job.name().to_string();
    info!(job = %name, expression = %trigger.expression, "Scheduled job registered");

    loop {
        let now = Utc::now().with_timezone(&clock.offset());
        let Some(next) = trigger.schedule.after(&now).next() else {
            warn!(job = %name, "Schedule has no upcoming runs, stopping trigger");
            return;
        };

        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        let today = next.date_naive();
        let job = trigger.job.clone();
        info!(job = %name, run_date = %today, "Scheduled job starting");

        match tokio::spawn(async move { job.run(today).await }).await {
            Ok(Ok(())) => info!(job = %name, run_date = %today, "Scheduled job finished"),
            Ok(Err(e)) => error!(job = %name, run_date = %today, error = %e, "Scheduled job failed"),
            Err(e) => error!(job = %name, run_date = %today, error = %e, "Scheduled job panicked"),
        }
    }
}
