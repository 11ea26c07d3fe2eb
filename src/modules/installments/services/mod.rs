pub mod reminder_dispatcher;
pub mod settlement_engine;

pub use reminder_dispatcher::{ReminderDispatcher, DEFAULT_REMINDER_LEAD_DAYS};
pub use settlement_engine::{SettlementEngine, DEFAULT_RETRY_OFFSET_DAYS};
