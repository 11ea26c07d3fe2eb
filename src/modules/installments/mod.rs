pub mod models;
pub mod services;

pub use models::{
    InstallmentEntry, InstallmentFrequency, PaymentPlan, PaymentPlanRequest, PlanType,
    ReminderReport, SettlementOutcome, SettlementReport,
};
pub use services::{ReminderDispatcher, SettlementEngine};
