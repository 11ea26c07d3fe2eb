// Installment settlement.
//
// `process_scheduled_installments` charges every due installment order once.
// Orders are settled one at a time and independently: a charge failure becomes
// a `failed` history entry, a persistence failure is logged and counted, and
// neither stops the batch. Notifications go out only after the order has been
// saved.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{error, info, warn};

use crate::core::{AppError, Result};
use crate::modules::installments::models::{PaymentPlan, SettlementOutcome, SettlementReport};
use crate::modules::notifications::{templates, NotificationDispatcher};
use crate::modules::orders::models::{Order, PaymentStatus};
use crate::modules::orders::repositories::{OrderFilter, OrderRepository};
use crate::modules::orders::services::apply_payment_state;
use crate::modules::payments::{ChargeRequest, PaymentProvider};

/// Days a declined scheduled charge is pushed out by default
pub const DEFAULT_RETRY_OFFSET_DAYS: u32 = 3;

/// Who asked for the charge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Daily settlement run; a decline reschedules the installment
    Scheduled,
    /// Customer "pay now"; a decline leaves the schedule alone
    Customer,
}

pub struct SettlementEngine {
    repo: Arc<dyn OrderRepository>,
    provider: Arc<dyn PaymentProvider>,
    notifications: Arc<NotificationDispatcher>,
    retry_offset_days: u32,
}

impl SettlementEngine {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        provider: Arc<dyn PaymentProvider>,
        notifications: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            repo,
            provider,
            notifications,
            retry_offset_days: DEFAULT_RETRY_OFFSET_DAYS,
        }
    }

    pub fn with_retry_offset_days(mut self, days: u32) -> Self {
        self.retry_offset_days = days;
        self
    }

    /// Charge every installment order due on or before `today`.
    ///
    /// Only the due-order query can fail the run; per-order errors are
    /// counted in the report.
    pub async fn process_scheduled_installments(
        &self,
        today: NaiveDate,
    ) -> Result<SettlementReport> {
        let due = self
            .repo
            .find(&OrderFilter::due_installments(today))
            .await?;

        let mut report = SettlementReport::for_date(today);
        report.due = due.len();

        info!(run_date = %today, due = report.due, "Settlement run started");

        for order in due {
            let order_id = order.id.clone();
            match self.settle(order, Trigger::Scheduled).await {
                Ok(outcome) => report.record(&order_id, &outcome),
                Err(e) => {
                    error!(order_id = %order_id, error = %e, "Failed to settle order");
                    report.record_error(&order_id);
                }
            }
        }

        info!(
            run_date = %today,
            due = report.due,
            settled = report.settled,
            completed = report.completed,
            failed = report.failed,
            skipped = report.skipped,
            errors = report.errors,
            "Settlement run finished"
        );

        Ok(report)
    }

    /// Customer-initiated charge of the next installment, or of the whole
    /// total for a pay-in-full order.
    ///
    /// A declined charge is returned as `SettlementOutcome::Failed`, not as
    /// an error.
    pub async fn pay_now(&self, order_id: &str, owner_ref: &str) -> Result<SettlementOutcome> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .filter(|o| o.owner_ref == owner_ref)
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;

        if order.status.is_fulfillment_owned() {
            return Err(AppError::validation(format!(
                "Order {} cannot be paid in status {}",
                order_id, order.status
            )));
        }

        let already_paid = match order.installment_plan() {
            Some(plan) => plan.is_complete(),
            None => order.payment_status == PaymentStatus::Paid,
        };
        if already_paid {
            return Err(AppError::validation(format!(
                "Order {} is already fully paid",
                order_id
            )));
        }

        self.settle(order, Trigger::Customer).await
    }

    async fn settle(&self, mut order: Order, trigger: Trigger) -> Result<SettlementOutcome> {
        if order.status.is_fulfillment_owned() {
            return Ok(SettlementOutcome::Skipped {
                reason: format!("order is {}", order.status),
            });
        }

        let is_installment = order.is_installment();
        if !is_installment && order.payment_status == PaymentStatus::Paid {
            return Ok(SettlementOutcome::Skipped {
                reason: "order is already paid".to_string(),
            });
        }

        let total = order.total;
        if order.payment_plan.is_none() {
            // Pay-in-full attempts are tracked on a single-charge plan
            order.payment_plan = Some(PaymentPlan::full(total));
        }
        let plan = plan_mut(&mut order)?;

        if plan.is_complete() {
            return Ok(SettlementOutcome::Skipped {
                reason: format!("all {} installments already paid", plan.installment_count),
            });
        }

        let installment_number = plan.next_installment_number();
        let amount = plan.next_charge_amount(total);
        let attempt = plan.attempts_for(installment_number) + 1;

        let request = ChargeRequest {
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            installment_number,
            amount,
            currency: order.currency,
            handle: order.payment_handle(),
            idempotency_key: ChargeRequest::idempotency_key_for(
                &order.id,
                installment_number,
                attempt,
            ),
        };

        match self.provider.charge(&request).await {
            Ok(receipt) => {
                let plan = plan_mut(&mut order)?;
                plan.record_success(amount, receipt.external_ref.clone(), receipt.charged_at)?;
                let remaining = plan.remaining_installments();
                let next_installment_date = plan.next_installment_date;

                if !is_installment {
                    order.payment_status = PaymentStatus::Paid;
                }
                apply_payment_state(&mut order);
                let order = self.repo.save(order).await?;

                info!(
                    order_id = %order.id,
                    installment_number,
                    amount = %amount,
                    remaining,
                    external_ref = %receipt.external_ref,
                    provider = self.provider.name(),
                    "Installment charged"
                );

                if remaining == 0 {
                    self.notifications
                        .emit(templates::final_payment(&order, amount));
                    Ok(SettlementOutcome::Completed {
                        installment_number,
                        amount,
                    })
                } else {
                    self.notifications.emit(templates::installment_progress(
                        &order,
                        installment_number,
                        amount,
                        remaining,
                        next_installment_date,
                    ));
                    Ok(SettlementOutcome::Settled {
                        installment_number,
                        amount,
                        remaining,
                        next_installment_date,
                    })
                }
            }
            Err(e) => {
                let reason = match e {
                    AppError::Payment(msg) => msg,
                    other => other.to_string(),
                };
                let reschedule = is_installment && trigger == Trigger::Scheduled;

                let plan = plan_mut(&mut order)?;
                plan.record_failure(
                    amount,
                    reason.clone(),
                    Utc::now(),
                    self.retry_offset_days,
                    reschedule,
                )?;
                let retry_date = if reschedule {
                    plan.next_installment_date
                } else {
                    None
                };

                if !is_installment {
                    order.payment_status = PaymentStatus::Failed;
                }
                apply_payment_state(&mut order);
                let order = self.repo.save(order).await?;

                warn!(
                    order_id = %order.id,
                    installment_number,
                    amount = %amount,
                    reason = %reason,
                    retry_date = ?retry_date,
                    "Installment charge failed"
                );

                self.notifications.emit(templates::payment_failed(
                    &order, amount, &reason, retry_date,
                ));

                Ok(SettlementOutcome::Failed {
                    installment_number,
                    amount,
                    reason,
                    retry_date,
                })
            }
        }
    }
}

fn plan_mut(order: &mut Order) -> Result<&mut PaymentPlan> {
    match order.payment_plan.as_mut() {
        Some(plan) => Ok(plan),
        None => Err(AppError::internal(format!(
            "Order {} has no payment plan",
            order.id
        ))),
    }
}
