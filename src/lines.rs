//! Bill Lines

use serde::{Deserialize, Serialize};

use crate::bill::BillError;

/// A purchased line as seen by the bill calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillLine {
    /// Commodity being purchased.
    pub commodity_id: i64,

    /// Number of units purchased.
    pub quantity: u32,

    /// Selling price of a single unit, in minor units.
    pub unit_price: u64,
}

impl BillLine {
    /// Create a new bill line.
    pub fn new(commodity_id: i64, quantity: u32, unit_price: u64) -> Self {
        Self {
            commodity_id,
            quantity,
            unit_price,
        }
    }

    /// Line total (`quantity × unit_price`), or `None` on overflow.
    pub fn subtotal(&self) -> Option<u64> {
        u64::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// Sum of every line's `quantity × unit_price`.
///
/// An empty slice totals to zero.
///
/// # Errors
///
/// Returns [`BillError::Overflow`] when a line total or the running sum does not fit in a `u64`.
pub fn original_total(lines: &[BillLine]) -> Result<u64, BillError> {
    lines.iter().try_fold(0_u64, |acc, line| {
        line.subtotal()
            .and_then(|subtotal| acc.checked_add(subtotal))
            .ok_or(BillError::Overflow)
    })
}
