use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use storefront::core::Currency;
use storefront::installments::models::{InstallmentFrequency, PaymentPlanRequest, PlanType};
use storefront::orders::models::{AchAccountType, AchDetails, CreateOrderRequest, OrderItem};

pub const OWNER: &str = "user-1";

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `hour`:00 UTC on the given day
pub fn at(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap()
}

pub fn ach_details(account_ref: &str) -> AchDetails {
    AchDetails {
        account_holder_name: "Jane Buyer".to_string(),
        account_type: AchAccountType::Checking,
        account_last4: "6789".to_string(),
        routing_number: "110000000".to_string(),
        mandate_accepted: true,
        mandate_date: Some(at(2025, 1, 1, 0)),
        external_customer_ref: Some("cus_test".to_string()),
        external_bank_account_ref: Some(account_ref.to_string()),
    }
}

/// Pay-in-full checkout for `total`
pub fn full_order_request(total: Decimal) -> CreateOrderRequest {
    CreateOrderRequest {
        items: vec![OrderItem::new("prod-1", "Walnut Desk", total, 1).unwrap()],
        shipping_address: "12 Harbour Road, Springfield".to_string(),
        contact_email: "jane@example.com".to_string(),
        currency: Currency::USD,
        total,
        payment_method: "credit_card".to_string(),
        ach_details: None,
        payment_plan: None,
    }
}

/// ACH installment checkout: `count` x `amount`, first charge on `first_date`
pub fn installment_order_request(
    count: u32,
    amount: Decimal,
    frequency: InstallmentFrequency,
    first_date: NaiveDate,
) -> CreateOrderRequest {
    let total = amount * Decimal::from(count);
    CreateOrderRequest {
        payment_method: "ach".to_string(),
        ach_details: Some(ach_details("ba_good")),
        payment_plan: Some(PaymentPlanRequest {
            plan_type: PlanType::Installment,
            installment_count: count,
            installment_amount: Some(amount),
            installment_frequency: frequency,
            first_installment_date: Some(first_date),
        }),
        ..full_order_request(total)
    }
}

/// The 3 x $100 monthly plan used across the suites
pub fn three_by_hundred(first_date: NaiveDate) -> CreateOrderRequest {
    installment_order_request(3, dec!(100), InstallmentFrequency::Monthly, first_date)
}
