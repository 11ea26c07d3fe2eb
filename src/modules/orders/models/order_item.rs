// Line of an order, snapshotted from the catalog at checkout.
//
// Items are never re-joined to the live catalog: a later price or name
// change on the product does not affect an existing order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Currency, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_ref: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image_ref: Option<String>,
}

impl OrderItem {
    pub fn new(
        product_ref: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Result<Self> {
        let item = Self {
            product_ref: product_ref.into(),
            name: name.into(),
            unit_price,
            quantity,
            image_ref: None,
        };
        item.validate()?;
        Ok(item)
    }

    /// quantity × unit_price
    pub fn subtotal(&self) -> Result<Decimal> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| {
                AppError::validation(format!("Item '{}' subtotal is out of range", self.name))
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.product_ref.trim().is_empty() {
            return Err(AppError::validation("Item product reference cannot be empty"));
        }

        if self.name.trim().is_empty() {
            return Err(AppError::validation("Item name cannot be empty"));
        }

        if self.name.len() > 255 {
            return Err(AppError::validation("Item name cannot exceed 255 characters"));
        }

        if self.quantity < 1 {
            return Err(AppError::validation(format!(
                "Item '{}' quantity must be at least 1",
                self.name
            )));
        }

        if self.unit_price < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Item '{}' unit price cannot be negative",
                self.name
            )));
        }

        Ok(())
    }

    /// Validate the unit price precision against the order currency
    pub fn validate_currency(&self, currency: Currency) -> Result<()> {
        currency
            .validate_amount(self.unit_price)
            .map_err(|e| AppError::validation(format!("Item '{}': {}", self.name, e)))
    }
}
