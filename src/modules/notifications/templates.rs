// Customer-facing message bodies for the payment lifecycle.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::notifier::EmailMessage;
use crate::modules::orders::models::Order;

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Installment settled, more remain
pub fn installment_progress(
    order: &Order,
    installment_number: u32,
    amount: Decimal,
    remaining: u32,
    next_date: Option<NaiveDate>,
) -> EmailMessage {
    let next = match next_date {
        Some(date) => format!("Your next installment is scheduled for {}.", long_date(date)),
        None => "Your next installment date will follow shortly.".to_string(),
    };

    EmailMessage::new(
        &order.contact_email,
        format!("Payment received for order {}", order.order_number),
        format!(
            "We received installment {} of {} for order {}.\n\n\
             Installments remaining: {}\n{}\n",
            installment_number,
            order.currency.format_amount(amount),
            order.order_number,
            remaining,
            next
        ),
    )
}

/// Order fully paid
pub fn final_payment(order: &Order, amount: Decimal) -> EmailMessage {
    EmailMessage::new(
        &order.contact_email,
        format!("Order {} is fully paid", order.order_number),
        format!(
            "We received your final payment of {} for order {}.\n\n\
             Your order total of {} is now settled and your order will be prepared for shipping.\n",
            order.currency.format_amount(amount),
            order.order_number,
            order.currency.format_amount(order.total)
        ),
    )
}

/// Charge declined
pub fn payment_failed(
    order: &Order,
    amount: Decimal,
    reason: &str,
    retry_date: Option<NaiveDate>,
) -> EmailMessage {
    let retry = match retry_date {
        Some(date) => format!("We will try again on {}.", long_date(date)),
        None => "No automatic retry is scheduled for this attempt.".to_string(),
    };

    EmailMessage::new(
        &order.contact_email,
        format!("Payment failed for order {}", order.order_number),
        format!(
            "We could not collect {} for order {} using {}.\n\n\
             Reason: {}\n{}\n\
             Please make sure your payment details are up to date.\n",
            order.currency.format_amount(amount),
            order.order_number,
            order.masked_payment_identifier(),
            reason,
            retry
        ),
    )
}

/// Upcoming installment
pub fn payment_reminder(order: &Order, amount: Decimal, due_date: NaiveDate) -> EmailMessage {
    EmailMessage::new(
        &order.contact_email,
        format!("Upcoming payment for order {}", order.order_number),
        format!(
            "Your next installment of {} for order {} will be charged on {} to {}.\n",
            order.currency.format_amount(amount),
            order.order_number,
            long_date(due_date),
            order.masked_payment_identifier()
        ),
    )
}
