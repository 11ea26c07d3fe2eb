use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::order_number::OrderNumberGenerator;
use crate::core::{AppError, BusinessClock, Result};
use crate::modules::orders::models::{CreateOrderRequest, Order, OrderStatus, PaymentSummary};
use crate::modules::orders::repositories::OrderRepository;

/// Service for order ledger business logic
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    numbers: OrderNumberGenerator,
    clock: BusinessClock,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>, clock: BusinessClock) -> Self {
        Self {
            numbers: OrderNumberGenerator::new(repo.clone(), clock),
            repo,
            clock,
        }
    }

    pub fn clock(&self) -> BusinessClock {
        self.clock
    }

    /// Create an order for `owner_ref`
    pub async fn create_order(&self, owner_ref: &str, request: CreateOrderRequest) -> Result<Order> {
        self.create_order_at(owner_ref, request, Utc::now()).await
    }

    /// Create an order as of `now`.
    ///
    /// The order, payment plan included, is built and validated before the
    /// order number is reserved, so a rejected request consumes nothing.
    /// `total` is stored as submitted.
    pub async fn create_order_at(
        &self,
        owner_ref: &str,
        request: CreateOrderRequest,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        if owner_ref.trim().is_empty() {
            return Err(AppError::validation("Owner reference is required"));
        }
        request.validate()?;

        let items_total = request.items_total()?;
        if items_total != request.total {
            warn!(
                owner_ref = %owner_ref,
                total = %request.total,
                items_total = %items_total,
                "Order total does not match item subtotals"
            );
        }

        let mut order = Order::from_request(
            Uuid::new_v4().to_string(),
            owner_ref.to_string(),
            String::new(),
            request,
            now,
            self.clock.local_date(now),
        )?;
        order.order_number = self.numbers.next(now).await?;

        let order = self.repo.insert(order).await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total,
            installment = order.is_installment(),
            "Order created"
        );

        Ok(order)
    }

    pub async fn get_order(&self, id: &str) -> Result<Order> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))
    }

    /// Fetch an order on behalf of `owner_ref`. Another owner's order is
    /// reported as not found.
    pub async fn get_order_for_owner(&self, id: &str, owner_ref: &str) -> Result<Order> {
        let order = self.get_order(id).await?;
        if order.owner_ref != owner_ref {
            return Err(AppError::not_found(format!("Order {} not found", id)));
        }
        Ok(order)
    }

    pub async fn payment_summary(&self, id: &str, owner_ref: &str) -> Result<PaymentSummary> {
        let order = self.get_order_for_owner(id, owner_ref).await?;
        Ok(PaymentSummary::from(&order))
    }

    /// Orders created on `day` in the business timezone
    pub async fn orders_created_on(&self, day: NaiveDate) -> Result<u64> {
        let (start, end) = self.clock.day_bounds(day);
        self.repo.count_created_between(start, end).await
    }

    /// Hand the order to the carrier. Only fully paid orders ship.
    pub async fn mark_shipped(&self, id: &str, tracking_number: &str) -> Result<Order> {
        if tracking_number.trim().is_empty() {
            return Err(AppError::validation("Tracking number is required"));
        }

        let mut order = self.get_order(id).await?;
        if !order.ready_to_ship {
            return Err(AppError::validation(format!(
                "Order {} is not ready to ship (payment status {})",
                id, order.payment_status
            )));
        }
        if matches!(
            order.status,
            OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Cancelled
        ) {
            return Err(AppError::validation(format!(
                "Order {} cannot ship from status {}",
                id, order.status
            )));
        }

        order.status = OrderStatus::Shipped;
        order.tracking_number = Some(tracking_number.trim().to_string());
        order.shipped_date = Some(Utc::now());

        let order = self.repo.save(order).await?;
        info!(order_id = %order.id, tracking_number = %tracking_number, "Order shipped");
        Ok(order)
    }

    pub async fn mark_delivered(&self, id: &str) -> Result<Order> {
        let mut order = self.get_order(id).await?;
        if order.status != OrderStatus::Shipped {
            return Err(AppError::validation(format!(
                "Order {} cannot be delivered from status {}",
                id, order.status
            )));
        }

        order.status = OrderStatus::Delivered;
        let order = self.repo.save(order).await?;
        info!(order_id = %order.id, "Order delivered");
        Ok(order)
    }

    /// Cancel an order that has not shipped. Cancelled orders leave the
    /// settlement and reminder queries.
    pub async fn cancel_order(&self, id: &str) -> Result<Order> {
        let mut order = self.get_order(id).await?;
        match order.status {
            OrderStatus::Shipped | OrderStatus::Delivered => {
                return Err(AppError::validation(format!(
                    "Order {} has already shipped",
                    id
                )));
            }
            OrderStatus::Cancelled => {
                return Err(AppError::conflict(format!("Order {} is already cancelled", id)));
            }
            _ => {}
        }

        order.status = OrderStatus::Cancelled;
        let order = self.repo.save(order).await?;
        info!(order_id = %order.id, "Order cancelled");
        Ok(order)
    }
}
