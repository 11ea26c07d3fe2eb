use crate::core::{Currency, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment provider the settlement engine charges through
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Charge `request.amount` against `request.handle`.
    ///
    /// A declined or failed charge is an `Err`; callers record it in the
    /// order's installment history rather than propagating it.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt>;

    /// Provider name, used in logs
    fn name(&self) -> &str;
}

/// References identifying what to charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHandle {
    /// Free-text method tag (`credit_card`, `ach`, ...)
    pub payment_method: String,
    /// Provider-side customer reference
    pub customer_ref: Option<String>,
    /// Provider-side bank account / card reference
    pub account_ref: Option<String>,
}

/// Charge request data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub order_id: String,
    pub order_number: String,
    /// 1-based installment being settled (1 for pay-in-full orders)
    pub installment_number: u32,
    pub amount: Decimal,
    pub currency: Currency,
    pub handle: PaymentHandle,
    /// Stable per attempt: `{order_id}:{installment_number}:{attempt}`
    pub idempotency_key: String,
}

impl ChargeRequest {
    pub fn idempotency_key_for(order_id: &str, installment_number: u32, attempt: usize) -> String {
        format!("{}:{}:{}", order_id, installment_number, attempt)
    }
}

/// Successful charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    /// Provider transaction reference stored in the installment history
    pub external_ref: String,
    pub charged_at: DateTime<Utc>,
}
