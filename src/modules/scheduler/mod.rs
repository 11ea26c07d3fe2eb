// Daily batch triggers

pub mod daily;
pub mod job;

pub use daily::{parse_schedule, DailyScheduler};
pub use job::ScheduledJob;
