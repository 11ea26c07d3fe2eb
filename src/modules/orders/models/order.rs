// Order ledger entry.
//
// One order per checkout. The payment-derived fields (`status` during the
// payment phase, `payment_status`, `ready_to_ship`) are owned by
// `orders::services::payment_state` and recomputed on every persist; nothing
// else assigns them directly. Orders are never deleted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ach_details::AchDetails;
use super::order_item::OrderItem;
use crate::core::{AppError, Currency, Result};
use crate::modules::installments::models::{PaymentPlan, PaymentPlanRequest};
use crate::modules::payments::PaymentHandle;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    PaymentInProgress,
    PaymentComplete,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PaymentInProgress => "payment_in_progress",
            Self::PaymentComplete => "payment_complete",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses the settlement and reminder jobs select
    pub fn awaiting_payment() -> [OrderStatus; 2] {
        [Self::Pending, Self::PaymentInProgress]
    }

    /// Statuses set by fulfillment, which payment derivation leaves alone
    pub fn is_fulfillment_owned(&self) -> bool {
        matches!(
            self,
            Self::Processing | Self::Shipped | Self::Delivered | Self::Cancelled
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "payment_in_progress" => Ok(Self::PaymentInProgress),
            "payment_complete" => Ok(Self::PaymentComplete),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

/// Payment progress of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const DEFAULT_PAYMENT_METHOD: &str = "credit_card";

fn default_payment_method() -> String {
    DEFAULT_PAYMENT_METHOD.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub owner_ref: String,
    /// `ORD-YYYYMMDD-NNN`
    pub order_number: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: String,
    pub contact_email: String,
    #[serde(default)]
    pub currency: Currency,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub tracking_number: Option<String>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub ach_details: Option<AchDetails>,
    /// Absent means pay in full
    pub payment_plan: Option<PaymentPlan>,
    #[serde(default)]
    pub ready_to_ship: bool,
    /// Bumped by every successful persist
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a new ledger entry from a validated checkout request.
    ///
    /// `order_number` must already be reserved for `created_at`'s business day.
    pub fn from_request(
        id: String,
        owner_ref: String,
        order_number: String,
        request: CreateOrderRequest,
        created_at: DateTime<Utc>,
        creation_day: NaiveDate,
    ) -> Result<Self> {
        let payment_plan = match request.payment_plan {
            Some(plan) => Some(plan.into_plan(request.total, request.currency, creation_day)?),
            None => None,
        };

        Ok(Self {
            id,
            owner_ref,
            order_number,
            items: request.items,
            shipping_address: request.shipping_address,
            contact_email: request.contact_email,
            currency: request.currency,
            total: request.total,
            status: OrderStatus::Pending,
            payment_method: request.payment_method,
            payment_status: PaymentStatus::Pending,
            tracking_number: None,
            shipped_date: None,
            ach_details: request.ach_details,
            payment_plan,
            ready_to_ship: false,
            version: 0,
            created_at,
            updated_at: created_at,
        })
    }

    pub fn is_installment(&self) -> bool {
        self.payment_plan.as_ref().is_some_and(|p| p.is_installment())
    }

    /// Installment plan, if the order is paid in installments
    pub fn installment_plan(&self) -> Option<&PaymentPlan> {
        self.payment_plan.as_ref().filter(|p| p.is_installment())
    }

    /// Amount still owed on the order
    pub fn remaining_balance(&self) -> Decimal {
        if self.payment_status == PaymentStatus::Paid {
            return Decimal::ZERO;
        }
        match self.installment_plan() {
            Some(plan) => (self.total - plan.amount_paid()).max(Decimal::ZERO),
            None => self.total,
        }
    }

    /// Identifier safe to show in customer messages: the masked account
    /// number when bank details are on file, otherwise the method tag
    pub fn masked_payment_identifier(&self) -> String {
        match &self.ach_details {
            Some(ach) => ach.masked_account(),
            None => self.payment_method.clone(),
        }
    }

    /// References the payment provider charges against
    pub fn payment_handle(&self) -> PaymentHandle {
        PaymentHandle {
            payment_method: self.payment_method.clone(),
            customer_ref: self
                .ach_details
                .as_ref()
                .and_then(|a| a.external_customer_ref.clone()),
            account_ref: self
                .ach_details
                .as_ref()
                .and_then(|a| a.external_bank_account_ref.clone()),
        }
    }
}

/// Checkout payload accepted by `OrderService::create_order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping_address: String,
    pub contact_email: String,
    #[serde(default)]
    pub currency: Currency,
    /// Trusted as submitted; see `OrderService::create_order`
    pub total: Decimal,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub ach_details: Option<AchDetails>,
    pub payment_plan: Option<PaymentPlanRequest>,
}

impl CreateOrderRequest {
    /// Reject malformed input. Runs before anything is written.
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(AppError::validation("Order must have at least one item"));
        }

        for item in &self.items {
            item.validate()?;
            item.validate_currency(self.currency)?;
        }
        self.items_total()?;

        if self.shipping_address.trim().is_empty() {
            return Err(AppError::validation("Shipping address is required"));
        }

        if !is_plausible_email(&self.contact_email) {
            return Err(AppError::validation(format!(
                "Invalid contact email: {}",
                self.contact_email
            )));
        }

        if self.total <= Decimal::ZERO {
            return Err(AppError::validation("Order total must be positive"));
        }
        self.currency
            .validate_amount(self.total)
            .map_err(AppError::Validation)?;

        if self.payment_method.trim().is_empty() {
            return Err(AppError::validation("Payment method cannot be empty"));
        }

        match &self.ach_details {
            Some(ach) => ach.validate()?,
            None if self.payment_method.eq_ignore_ascii_case("ach") => {
                return Err(AppError::validation(
                    "ACH payment method requires bank account details",
                ));
            }
            None => {}
        }

        if let Some(plan) = &self.payment_plan {
            plan.validate(self.total, self.currency)?;
        }

        Ok(())
    }

    /// Sum of item subtotals. Out-of-range sums are validation errors.
    pub fn items_total(&self) -> Result<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, item| {
            sum.checked_add(item.subtotal()?)
                .ok_or_else(|| AppError::validation("Order item total is out of range"))
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}
