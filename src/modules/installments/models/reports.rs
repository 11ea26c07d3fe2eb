use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Result of settling one order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// Installment charged, more remain
    Settled {
        installment_number: u32,
        amount: Decimal,
        remaining: u32,
        next_installment_date: Option<NaiveDate>,
    },
    /// Charge settled the final installment (or the full order total)
    Completed {
        installment_number: u32,
        amount: Decimal,
    },
    /// Charge declined; recorded in history
    Failed {
        installment_number: u32,
        amount: Decimal,
        reason: String,
        retry_date: Option<NaiveDate>,
    },
    /// Nothing was charged
    Skipped { reason: String },
}

impl SettlementOutcome {
    /// Same name the outcome serializes under
    pub fn label(&self) -> &'static str {
        match self {
            SettlementOutcome::Settled { .. } => "settled",
            SettlementOutcome::Completed { .. } => "completed",
            SettlementOutcome::Failed { .. } => "failed",
            SettlementOutcome::Skipped { .. } => "skipped",
        }
    }
}

/// Summary of one settlement run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettlementReport {
    pub run_date: Option<NaiveDate>,
    /// Orders selected by the due query
    pub due: usize,
    pub settled: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Orders whose outcome could not be persisted
    pub errors: usize,
    pub failed_order_ids: Vec<String>,
    pub errored_order_ids: Vec<String>,
}

impl SettlementReport {
    pub fn for_date(run_date: NaiveDate) -> Self {
        Self {
            run_date: Some(run_date),
            ..Default::default()
        }
    }

    pub fn record(&mut self, order_id: &str, outcome: &SettlementOutcome) {
        match outcome {
            SettlementOutcome::Settled { .. } => self.settled += 1,
            SettlementOutcome::Completed { .. } => self.completed += 1,
            SettlementOutcome::Failed { .. } => {
                self.failed += 1;
                self.failed_order_ids.push(order_id.to_string());
            }
            SettlementOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn record_error(&mut self, order_id: &str) {
        self.errors += 1;
        self.errored_order_ids.push(order_id.to_string());
    }

    /// Charges that went through in this run
    pub fn charged(&self) -> usize {
        self.settled + self.completed
    }
}

/// Summary of one reminder run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReminderReport {
    pub due_date: Option<NaiveDate>,
    pub matched: usize,
    pub dispatched: usize,
    pub reminded_order_ids: Vec<String>,
}
