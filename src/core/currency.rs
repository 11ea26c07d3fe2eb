use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest whole-unit amount accepted for any single price, charge or total
pub const MAX_WHOLE_UNITS: i64 = 1_000_000_000_000_000;

/// Settlement currencies accepted at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indonesian Rupiah (no decimal places)
    IDR,
    /// Malaysian Ringgit (2 decimal places)
    MYR,
    /// US Dollar (2 decimal places)
    #[default]
    USD,
}

impl Currency {
    /// Decimal places carried by amounts in this currency
    pub fn scale(&self) -> u32 {
        match self {
            Currency::IDR => 0,
            Currency::MYR | Currency::USD => 2,
        }
    }

    /// Rounds an amount to this currency's scale
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp(self.scale())
    }

    /// Rejects negative amounts, amounts above `MAX_WHOLE_UNITS` and amounts
    /// with more precision than the currency carries
    pub fn validate_amount(&self, amount: Decimal) -> Result<(), String> {
        if amount < Decimal::ZERO {
            return Err(format!("{} amount cannot be negative", self));
        }

        if amount > Decimal::from(MAX_WHOLE_UNITS) {
            return Err(format!(
                "{} amount {} exceeds the maximum of {}",
                self, amount, MAX_WHOLE_UNITS
            ));
        }

        if amount.normalize().scale() > self.scale() {
            return Err(format!(
                "{} amounts must have at most {} decimal places, got {}",
                self,
                self.scale(),
                amount
            ));
        }

        Ok(())
    }

    /// Splits `total` into `count` equal charges rounded to the currency scale.
    ///
    /// The rounded per-charge amount is returned; the remainder is absorbed by
    /// the final charge (see `PaymentPlan::next_charge_amount`).
    pub fn split_evenly(&self, total: Decimal, count: u32) -> Option<Decimal> {
        if count == 0 {
            return None;
        }
        Some(self.round(total / Decimal::from(count)))
    }

    /// Formats an amount for customer-facing messages
    pub fn format_amount(&self, amount: Decimal) -> String {
        let scale = self.scale();
        if scale == 0 {
            format!("{} {}", self, amount.round_dp(0))
        } else {
            format!("{} {:.width$}", self, amount, width = scale as usize)
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::IDR => write!(f, "IDR"),
            Currency::MYR => write!(f, "MYR"),
            Currency::USD => write!(f, "USD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IDR" => Ok(Currency::IDR),
            "MYR" => Ok(Currency::MYR),
            "USD" => Ok(Currency::USD),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}
