use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of one charge attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentEntryStatus {
    Pending,
    Paid,
    Failed,
}

impl InstallmentEntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for InstallmentEntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One attempted installment charge. Entries are appended, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentEntry {
    /// 1-based installment this attempt was for
    pub installment_number: u32,
    pub amount: Decimal,
    /// When the attempt ran (settlement time for paid entries)
    pub paid_date: DateTime<Utc>,
    pub external_payment_ref: Option<String>,
    pub status: InstallmentEntryStatus,
    pub failure_reason: Option<String>,
}

impl InstallmentEntry {
    pub fn paid(
        installment_number: u32,
        amount: Decimal,
        external_payment_ref: String,
        paid_date: DateTime<Utc>,
    ) -> Self {
        Self {
            installment_number,
            amount,
            paid_date,
            external_payment_ref: Some(external_payment_ref),
            status: InstallmentEntryStatus::Paid,
            failure_reason: None,
        }
    }

    pub fn failed(
        installment_number: u32,
        amount: Decimal,
        failure_reason: String,
        paid_date: DateTime<Utc>,
    ) -> Self {
        Self {
            installment_number,
            amount,
            paid_date,
            external_payment_ref: None,
            status: InstallmentEntryStatus::Failed,
            failure_reason: Some(failure_reason),
        }
    }
}
