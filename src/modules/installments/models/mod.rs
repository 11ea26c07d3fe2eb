pub mod installment_entry;
pub mod payment_plan;
pub mod reports;

pub use installment_entry::{InstallmentEntry, InstallmentEntryStatus};
pub use payment_plan::{
    InstallmentFrequency, PaymentPlan, PaymentPlanRequest, PlanType, MAX_INSTALLMENT_COUNT,
};
pub use reports::{ReminderReport, SettlementOutcome, SettlementReport};
