//! Stock arithmetic shared by the reconciliation engine and reports
//!
//! Everything here is pure: callers load the current quantity, ask for the
//! next one, and persist the result themselves.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MovementKind, StockStatus};

/// Reasons a quantity change cannot be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("quantity must be a positive integer, got {0}")]
    NonPositiveQuantity(i32),

    #[error("insufficient stock: {available} available, {requested} requested")]
    Insufficient { available: i32, requested: i32 },

    #[error("resulting quantity exceeds the supported range")]
    Overflow,
}

/// Quantity a product ends up with after a movement of `quantity` units.
///
/// Entries add, exits subtract. A result of exactly zero is allowed; anything
/// below zero is rejected with [`StockError::Insufficient`].
pub fn next_quantity(current: i32, kind: MovementKind, quantity: i32) -> Result<i32, StockError> {
    if quantity <= 0 {
        return Err(StockError::NonPositiveQuantity(quantity));
    }

    match kind {
        MovementKind::Entry => current.checked_add(quantity).ok_or(StockError::Overflow),
        MovementKind::Exit => {
            let next = current.checked_sub(quantity).ok_or(StockError::Overflow)?;
            if next < 0 {
                return Err(StockError::Insufficient {
                    available: current,
                    requested: quantity,
                });
            }
            Ok(next)
        }
    }
}

/// Signed delta a movement applies to product quantity
pub fn signed_delta(kind: MovementKind, quantity: i32) -> i64 {
    match kind {
        MovementKind::Entry => i64::from(quantity),
        MovementKind::Exit => -i64::from(quantity),
    }
}

/// Totals over a set of products, as shown on the stock overview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTotals {
    pub total_products: i64,
    pub total_quantity: i64,
    pub total_value: Decimal,
    pub low_stock: i64,
    pub out_of_stock: i64,
}

impl InventoryTotals {
    /// Fold one product into the totals
    pub fn add(&mut self, quantity: i32, min_quantity: i32, price: Decimal) {
        self.total_products += 1;
        self.total_quantity += i64::from(quantity);
        self.total_value += price * Decimal::from(quantity);
        match StockStatus::classify(quantity, min_quantity) {
            StockStatus::OutOfStock => self.out_of_stock += 1,
            StockStatus::LowStock => self.low_stock += 1,
            StockStatus::InStock => {}
        }
    }
}

impl FromIterator<(i32, i32, Decimal)> for InventoryTotals {
    fn from_iter<I: IntoIterator<Item = (i32, i32, Decimal)>>(iter: I) -> Self {
        let mut totals = InventoryTotals::default();
        for (quantity, min_quantity, price) in iter {
            totals.add(quantity, min_quantity, price);
        }
        totals
    }
}
