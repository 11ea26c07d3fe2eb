// Property tests for the payment-derived order state

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use storefront::core::Currency;
use storefront::installments::models::{InstallmentFrequency, PaymentPlan, PlanType};
use storefront::orders::models::{Order, OrderStatus, PaymentStatus};
use storefront::orders::services::{apply_payment_state, derive_payment_state};

fn order(status: OrderStatus, payment_status: PaymentStatus, plan: Option<PaymentPlan>) -> Order {
    let now = Utc::now();
    Order {
        id: "order-1".to_string(),
        owner_ref: "user-1".to_string(),
        order_number: "ORD-20250101-001".to_string(),
        items: vec![],
        shipping_address: "1 Main St".to_string(),
        contact_email: "jane@example.com".to_string(),
        currency: Currency::USD,
        total: dec!(600),
        status,
        payment_method: "credit_card".to_string(),
        payment_status,
        tracking_number: None,
        shipped_date: None,
        ach_details: None,
        payment_plan: plan,
        ready_to_ship: false,
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

fn installment_plan(count: u32, paid: u32) -> PaymentPlan {
    PaymentPlan {
        plan_type: PlanType::Installment,
        installment_count: count,
        installment_amount: Decimal::from(600) / Decimal::from(count),
        installment_frequency: InstallmentFrequency::Monthly,
        installments_paid: paid,
        next_installment_date: None,
        installment_history: vec![],
    }
}

fn any_status() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::Pending),
        Just(OrderStatus::PaymentInProgress),
        Just(OrderStatus::PaymentComplete),
        Just(OrderStatus::Processing),
        Just(OrderStatus::Shipped),
        Just(OrderStatus::Delivered),
        Just(OrderStatus::Cancelled),
    ]
}

fn any_payment_status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Pending),
        Just(PaymentStatus::Partial),
        Just(PaymentStatus::Paid),
        Just(PaymentStatus::Failed),
    ]
}

proptest! {
    /// Property: an installment order is ready to ship iff every installment is paid
    #[test]
    fn prop_ready_iff_fully_paid(
        count in 1u32..=36,
        paid in 0u32..=40,
        status in any_status(),
        payment_status in any_payment_status(),
    ) {
        let mut o = order(status, payment_status, Some(installment_plan(count, paid)));
        apply_payment_state(&mut o);

        if paid >= count {
            prop_assert!(o.ready_to_ship);
            prop_assert_eq!(o.payment_status, PaymentStatus::Paid);
        } else {
            prop_assert!(!o.ready_to_ship);
        }
    }

    /// Property: applying the state twice changes nothing further
    #[test]
    fn prop_idempotent(
        count in 1u32..=36,
        paid in 0u32..=36,
        status in any_status(),
        payment_status in any_payment_status(),
        installment in any::<bool>(),
    ) {
        let plan = if installment { Some(installment_plan(count, paid)) } else { None };
        let mut o = order(status, payment_status, plan);

        let first = apply_payment_state(&mut o);
        let second = apply_payment_state(&mut o);
        prop_assert_eq!(first, second);
        prop_assert_eq!(derive_payment_state(&o), second);
    }

    /// Property: fulfillment-owned statuses survive derivation
    #[test]
    fn prop_fulfillment_status_kept(
        count in 1u32..=12,
        paid in 0u32..=12,
        status in prop_oneof![
            Just(OrderStatus::Processing),
            Just(OrderStatus::Shipped),
            Just(OrderStatus::Delivered),
            Just(OrderStatus::Cancelled),
        ],
    ) {
        let mut o = order(status, PaymentStatus::Pending, Some(installment_plan(count, paid)));
        apply_payment_state(&mut o);
        prop_assert_eq!(o.status, status);
    }

    /// Property: pay-in-full orders only derive `ready_to_ship`
    #[test]
    fn prop_full_payment_touches_only_ready_flag(
        status in any_status(),
        payment_status in any_payment_status(),
        explicit_plan in any::<bool>(),
    ) {
        let plan = explicit_plan.then(|| PaymentPlan::full(dec!(600)));
        let mut o = order(status, payment_status, plan);
        apply_payment_state(&mut o);

        prop_assert_eq!(o.status, status);
        prop_assert_eq!(o.payment_status, payment_status);
        prop_assert_eq!(o.ready_to_ship, payment_status == PaymentStatus::Paid);
    }
}

#[test]
fn test_three_by_hundred_progression() {
    let mut o = order(OrderStatus::Pending, PaymentStatus::Pending, Some(installment_plan(3, 0)));

    apply_payment_state(&mut o);
    assert_eq!(o.status, OrderStatus::Pending);
    assert_eq!(o.payment_status, PaymentStatus::Pending);

    for paid in 1..=2 {
        o.payment_plan.as_mut().unwrap().installments_paid = paid;
        apply_payment_state(&mut o);
        assert_eq!(o.status, OrderStatus::PaymentInProgress);
        assert_eq!(o.payment_status, PaymentStatus::Partial);
        assert!(!o.ready_to_ship);
    }

    o.payment_plan.as_mut().unwrap().installments_paid = 3;
    apply_payment_state(&mut o);
    assert_eq!(o.status, OrderStatus::PaymentComplete);
    assert_eq!(o.payment_status, PaymentStatus::Paid);
    assert!(o.ready_to_ship);
}
