use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchAccountType {
    Checking,
    Savings,
}

/// Bank-account snapshot taken when the customer authorised ACH debits.
///
/// Only the last four account digits are kept. The external handles are the
/// references the payment provider charges against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchDetails {
    pub account_holder_name: String,
    pub account_type: AchAccountType,
    pub account_last4: String,
    pub routing_number: String,
    #[serde(default)]
    pub mandate_accepted: bool,
    pub mandate_date: Option<DateTime<Utc>>,
    pub external_customer_ref: Option<String>,
    pub external_bank_account_ref: Option<String>,
}

impl AchDetails {
    pub fn validate(&self) -> Result<()> {
        if self.account_holder_name.trim().is_empty() {
            return Err(AppError::validation("Account holder name cannot be empty"));
        }

        if self.account_last4.len() != 4 || !self.account_last4.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Account last4 must be exactly 4 digits",
            ));
        }

        if self.routing_number.len() != 9 || !self.routing_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::validation("Routing number must be 9 digits"));
        }

        if self.mandate_accepted && self.mandate_date.is_none() {
            return Err(AppError::validation(
                "Mandate date is required once the mandate is accepted",
            ));
        }

        Ok(())
    }

    /// `****1234`
    pub fn masked_account(&self) -> String {
        format!("****{}", self.account_last4)
    }
}
