use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::installment_entry::{InstallmentEntry, InstallmentEntryStatus};
use crate::core::{AppError, Currency, Result};

/// How an order is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Single charge for the whole order total
    #[default]
    Full,
    /// Total split into a schedule of recurring charges
    Installment,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Installment => "installment",
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interval between two scheduled installment charges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
}

impl InstallmentFrequency {
    /// Next scheduled date after `date`.
    ///
    /// Monthly steps are calendar months; a day that does not exist in the
    /// target month clamps to its last day (Jan 31 -> Feb 28).
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Weekly => date.checked_add_days(Days::new(7)),
            Self::Biweekly => date.checked_add_days(Days::new(14)),
            Self::Monthly => date.checked_add_months(Months::new(1)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

fn default_installment_count() -> u32 {
    1
}

/// Payment plan carried by an order.
///
/// `installments_paid` and `installment_history` only ever grow; the history
/// holds one entry per attempted charge, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    #[serde(rename = "type", default)]
    pub plan_type: PlanType,
    #[serde(default = "default_installment_count")]
    pub installment_count: u32,
    pub installment_amount: Decimal,
    #[serde(default)]
    pub installment_frequency: InstallmentFrequency,
    #[serde(default)]
    pub installments_paid: u32,
    pub next_installment_date: Option<NaiveDate>,
    #[serde(default)]
    pub installment_history: Vec<InstallmentEntry>,
}

impl PaymentPlan {
    /// Pay-in-full plan for `total`
    pub fn full(total: Decimal) -> Self {
        Self {
            plan_type: PlanType::Full,
            installment_count: 1,
            installment_amount: total,
            installment_frequency: InstallmentFrequency::default(),
            installments_paid: 0,
            next_installment_date: None,
            installment_history: Vec::new(),
        }
    }

    pub fn is_installment(&self) -> bool {
        self.plan_type == PlanType::Installment
    }

    pub fn is_complete(&self) -> bool {
        self.installments_paid >= self.installment_count
    }

    pub fn remaining_installments(&self) -> u32 {
        self.installment_count.saturating_sub(self.installments_paid)
    }

    /// 1-based number of the installment the next charge settles
    pub fn next_installment_number(&self) -> u32 {
        self.installments_paid + 1
    }

    /// Whether a charge is due on `today`
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        self.is_installment()
            && !self.is_complete()
            && self.next_installment_date.is_some_and(|d| d <= today)
    }

    /// Attempts already recorded for `installment_number`
    pub fn attempts_for(&self, installment_number: u32) -> usize {
        self.installment_history
            .iter()
            .filter(|e| e.installment_number == installment_number)
            .count()
    }

    /// Amount the next charge should collect.
    ///
    /// Every installment charges `installment_amount` except the final one,
    /// which collects the remaining balance so rounding residue is absorbed.
    pub fn next_charge_amount(&self, order_total: Decimal) -> Decimal {
        if self.remaining_installments() != 1 {
            return self.installment_amount;
        }

        let prior = self.installment_amount * Decimal::from(self.installment_count - 1);
        let remainder = order_total - prior;
        if remainder > Decimal::ZERO {
            remainder
        } else {
            self.installment_amount
        }
    }

    /// Total of all successfully settled charges
    pub fn amount_paid(&self) -> Decimal {
        self.installment_history
            .iter()
            .filter(|e| e.status == InstallmentEntryStatus::Paid)
            .map(|e| e.amount)
            .sum()
    }

    /// Record a successful charge.
    ///
    /// Increments `installments_paid`, appends a `paid` entry and, while
    /// installments remain, advances the next date from the previously
    /// scheduled date rather than from the day the charge ran.
    pub fn record_success(
        &mut self,
        amount: Decimal,
        external_ref: String,
        charged_at: DateTime<Utc>,
    ) -> Result<&InstallmentEntry> {
        if self.is_complete() {
            return Err(AppError::validation(format!(
                "All {} installments are already paid",
                self.installment_count
            )));
        }

        let installment_number = self.next_installment_number();
        self.installments_paid += 1;

        if !self.is_complete() {
            let previous = self.next_installment_date.unwrap_or_else(|| charged_at.date_naive());
            self.next_installment_date = Some(
                self.installment_frequency
                    .advance(previous)
                    .ok_or_else(|| AppError::internal("Next installment date out of range"))?,
            );
        }

        self.push_entry(InstallmentEntry::paid(
            installment_number,
            amount,
            external_ref,
            charged_at,
        ))
    }

    /// Record a failed charge and push the next attempt `retry_offset_days` out.
    ///
    /// `reschedule` is false for customer-initiated attempts, which leave the
    /// schedule untouched.
    pub fn record_failure(
        &mut self,
        amount: Decimal,
        reason: String,
        attempted_at: DateTime<Utc>,
        retry_offset_days: u32,
        reschedule: bool,
    ) -> Result<&InstallmentEntry> {
        let installment_number = self.next_installment_number();

        if reschedule {
            let previous = self
                .next_installment_date
                .unwrap_or_else(|| attempted_at.date_naive());
            self.next_installment_date = Some(
                previous
                    .checked_add_days(Days::new(u64::from(retry_offset_days)))
                    .ok_or_else(|| AppError::internal("Retry date out of range"))?,
            );
        }

        self.push_entry(InstallmentEntry::failed(
            installment_number,
            amount,
            reason,
            attempted_at,
        ))
    }

    fn push_entry(&mut self, entry: InstallmentEntry) -> Result<&InstallmentEntry> {
        self.installment_history.push(entry);
        self.installment_history
            .last()
            .ok_or_else(|| AppError::internal("Installment history is empty after append"))
    }
}

/// Payment plan as submitted at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPlanRequest {
    #[serde(rename = "type", default)]
    pub plan_type: PlanType,
    #[serde(default = "default_installment_count")]
    pub installment_count: u32,
    /// Derived from the order total when omitted
    pub installment_amount: Option<Decimal>,
    #[serde(default)]
    pub installment_frequency: InstallmentFrequency,
    /// Defaults to the day the order is created
    pub first_installment_date: Option<NaiveDate>,
}

impl Default for PaymentPlanRequest {
    fn default() -> Self {
        Self {
            plan_type: PlanType::Full,
            installment_count: default_installment_count(),
            installment_amount: None,
            installment_frequency: InstallmentFrequency::default(),
            first_installment_date: None,
        }
    }
}

/// Upper bound on schedule length
pub const MAX_INSTALLMENT_COUNT: u32 = 36;

impl PaymentPlanRequest {
    /// Validate the plan against the order total.
    pub fn validate(&self, order_total: Decimal, currency: Currency) -> Result<()> {
        if self.plan_type == PlanType::Full {
            return Ok(());
        }

        if self.installment_count < 1 || self.installment_count > MAX_INSTALLMENT_COUNT {
            return Err(AppError::validation(format!(
                "Installment count must be between 1 and {}, got {}",
                MAX_INSTALLMENT_COUNT, self.installment_count
            )));
        }

        if let Some(amount) = self.installment_amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::validation("Installment amount must be positive"));
            }
            currency.validate_amount(amount).map_err(AppError::Validation)?;

            let prior = amount
                .checked_mul(Decimal::from(self.installment_count - 1))
                .ok_or_else(|| AppError::validation("Installment amount is out of range"))?;
            if prior >= order_total {
                return Err(AppError::validation(format!(
                    "Installment amount {} x {} leaves nothing for the final installment of a {} order",
                    amount,
                    self.installment_count - 1,
                    order_total
                )));
            }
        }

        if self.resolved_installment_amount(order_total, currency)? <= Decimal::ZERO {
            return Err(AppError::validation(
                "Calculated installment amount must be positive",
            ));
        }

        Ok(())
    }

    /// Explicit installment amount, or the total split evenly over the count
    fn resolved_installment_amount(&self, order_total: Decimal, currency: Currency) -> Result<Decimal> {
        match self.installment_amount {
            Some(amount) => Ok(amount),
            None => currency
                .split_evenly(order_total, self.installment_count)
                .ok_or_else(|| AppError::validation("Installment count cannot be zero")),
        }
    }

    /// Build the stored plan. `creation_day` is the business-calendar day the
    /// order is created on.
    pub fn into_plan(
        self,
        order_total: Decimal,
        currency: Currency,
        creation_day: NaiveDate,
    ) -> Result<PaymentPlan> {
        self.validate(order_total, currency)?;

        if self.plan_type == PlanType::Full {
            return Ok(PaymentPlan::full(order_total));
        }

        let installment_amount = self.resolved_installment_amount(order_total, currency)?;

        Ok(PaymentPlan {
            plan_type: PlanType::Installment,
            installment_count: self.installment_count,
            installment_amount,
            installment_frequency: self.installment_frequency,
            installments_paid: 0,
            next_installment_date: Some(self.first_installment_date.unwrap_or(creation_day)),
            installment_history: Vec::new(),
        })
    }
}
