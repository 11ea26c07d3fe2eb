// Payment-derived order state.
//
// `apply_payment_state` is the only code that assigns `payment_status`,
// `ready_to_ship` and the payment-phase values of `status`. Repositories run
// it on every insert and save, and the settlement engine runs it again right
// after mutating `installments_paid`.
//
// Rules:
// - pay in full (no plan, or plan type `full`):
//     ready_to_ship = payment_status == paid; nothing else is touched
// - installment plan:
//     paid >= count   -> ready_to_ship, paid, payment_complete
//     0 < paid        -> partial, payment_in_progress, not ready
//     paid == 0       -> left as is
//
// Once fulfillment has taken the order (processing, shipped, delivered,
// cancelled) its status is kept; payment_status and ready_to_ship are still
// derived.

use serde::Serialize;

use crate::modules::orders::models::{Order, OrderStatus, PaymentStatus};

/// The triple of fields derived from payment progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentState {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub ready_to_ship: bool,
}

impl PaymentState {
    pub fn of(order: &Order) -> Self {
        Self {
            status: order.status,
            payment_status: order.payment_status,
            ready_to_ship: order.ready_to_ship,
        }
    }
}

/// Compute the payment-derived fields for `order` without mutating it.
pub fn derive_payment_state(order: &Order) -> PaymentState {
    let current = PaymentState::of(order);

    let Some(plan) = order.installment_plan() else {
        return PaymentState {
            ready_to_ship: current.payment_status == PaymentStatus::Paid,
            ..current
        };
    };

    let keep_or = |derived: OrderStatus| {
        if current.status.is_fulfillment_owned() {
            current.status
        } else {
            derived
        }
    };

    if plan.installments_paid >= plan.installment_count {
        PaymentState {
            status: keep_or(OrderStatus::PaymentComplete),
            payment_status: PaymentStatus::Paid,
            ready_to_ship: true,
        }
    } else if plan.installments_paid > 0 {
        PaymentState {
            status: keep_or(OrderStatus::PaymentInProgress),
            payment_status: PaymentStatus::Partial,
            ready_to_ship: false,
        }
    } else {
        current
    }
}

/// Apply the derived payment state to `order`. Idempotent.
pub fn apply_payment_state(order: &mut Order) -> PaymentState {
    let state = derive_payment_state(order);
    order.status = state.status;
    order.payment_status = state.payment_status;
    order.ready_to_ship = state.ready_to_ship;
    state
}
