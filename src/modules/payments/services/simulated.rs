use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::provider_trait::{ChargeReceipt, ChargeRequest, PaymentProvider};
use crate::core::{AppError, Result};

/// In-process stand-in for a card/ACH processor.
///
/// Charges succeed unless the amount is not positive, an ACH charge has no
/// bank account reference, or the account reference is on the decline list.
/// Replaying an idempotency key returns the original receipt.
pub struct SimulatedProvider {
    declined_accounts: HashSet<String>,
    receipts: Mutex<HashMap<String, ChargeReceipt>>,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self {
            declined_accounts: HashSet::new(),
            receipts: Mutex::new(HashMap::new()),
        }
    }

    /// Decline every charge against these account references
    pub fn with_declined_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declined_accounts
            .extend(accounts.into_iter().map(Into::into));
        self
    }

    /// Number of distinct charges accepted so far
    pub fn accepted_charges(&self) -> usize {
        self.receipts.lock().len()
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for SimulatedProvider {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt> {
        if let Some(receipt) = self.receipts.lock().get(&request.idempotency_key) {
            info!(
                idempotency_key = %request.idempotency_key,
                external_ref = %receipt.external_ref,
                "Replayed charge, returning original receipt"
            );
            return Ok(receipt.clone());
        }

        if request.amount <= Decimal::ZERO {
            return Err(AppError::payment(format!(
                "Charge amount must be positive, got {}",
                request.amount
            )));
        }

        let is_ach = request.handle.payment_method.eq_ignore_ascii_case("ach");
        if is_ach && request.handle.account_ref.is_none() {
            return Err(AppError::payment("No bank account on file for ACH charge"));
        }

        if let Some(account) = &request.handle.account_ref {
            if self.declined_accounts.contains(account) {
                warn!(
                    order_id = %request.order_id,
                    installment_number = request.installment_number,
                    "Simulated charge declined"
                );
                return Err(AppError::payment(format!(
                    "Charge declined for account {}",
                    account
                )));
            }
        }

        let receipt = ChargeReceipt {
            external_ref: format!("sim_{}", Uuid::new_v4().simple()),
            charged_at: Utc::now(),
        };

        self.receipts
            .lock()
            .insert(request.idempotency_key.clone(), receipt.clone());

        info!(
            order_id = %request.order_id,
            installment_number = request.installment_number,
            amount = %request.amount,
            currency = %request.currency,
            external_ref = %receipt.external_ref,
            "Simulated charge accepted"
        );

        Ok(receipt)
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
