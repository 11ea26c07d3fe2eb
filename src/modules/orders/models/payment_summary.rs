use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::order::{Order, OrderStatus, PaymentStatus};
use crate::core::Currency;
use crate::modules::installments::models::{InstallmentEntry, InstallmentFrequency, PlanType};

/// Read view of an order's payment progress, returned by
/// `GET /api/orders/{id}/payment`
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub order_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub ready_to_ship: bool,
    pub currency: Currency,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub remaining_balance: Decimal,
    pub plan_type: PlanType,
    pub installment_count: u32,
    pub installments_paid: u32,
    pub installment_amount: Decimal,
    pub installment_frequency: Option<InstallmentFrequency>,
    pub next_installment_date: Option<NaiveDate>,
    /// What the next charge will collect; `None` once nothing is owed
    pub next_charge_amount: Option<Decimal>,
    pub payment_identifier: String,
    pub installment_history: Vec<InstallmentEntry>,
}

impl From<&Order> for PaymentSummary {
    fn from(order: &Order) -> Self {
        let remaining_balance = order.remaining_balance();
        let amount_paid = order.total - remaining_balance;

        let base = Self {
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            status: order.status,
            payment_status: order.payment_status,
            ready_to_ship: order.ready_to_ship,
            currency: order.currency,
            total: order.total,
            amount_paid,
            remaining_balance,
            plan_type: PlanType::Full,
            installment_count: 1,
            installments_paid: u32::from(order.payment_status == PaymentStatus::Paid),
            installment_amount: order.total,
            installment_frequency: None,
            next_installment_date: None,
            next_charge_amount: (remaining_balance > Decimal::ZERO).then_some(order.total),
            payment_identifier: order.masked_payment_identifier(),
            installment_history: order
                .payment_plan
                .as_ref()
                .map(|p| p.installment_history.clone())
                .unwrap_or_default(),
        };

        match order.installment_plan() {
            Some(plan) => Self {
                plan_type: PlanType::Installment,
                installment_count: plan.installment_count,
                installments_paid: plan.installments_paid,
                installment_amount: plan.installment_amount,
                installment_frequency: Some(plan.installment_frequency),
                next_installment_date: plan.next_installment_date,
                next_charge_amount: (!plan.is_complete())
                    .then(|| plan.next_charge_amount(order.total)),
                ..base
            },
            None => base,
        }
    }
}
