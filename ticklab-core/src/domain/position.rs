use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PositionError {
    #[error("quantity {requested} does not fit a position of {held}")]
    QuantityOverflow { requested: u64, held: i64 },
}

/// Holding of one strategy in its symbol.
///
/// `avg_price` is the quantity-weighted cost basis of the shares currently
/// held, and 0.0 whenever the position is flat.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub quantity: i64,
    pub avg_price: f64,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    fn overflow(&self, requested: u64) -> PositionError {
        PositionError::QuantityOverflow {
            requested,
            held: self.quantity,
        }
    }

    /// Add shares bought at `price`, re-averaging the cost basis.
    ///
    /// Leaves the position untouched when the new quantity would not fit.
    pub fn add(&mut self, quantity: u64, price: f64) -> Result<(), PositionError> {
        let total = i64::try_from(quantity)
            .ok()
            .and_then(|q| self.quantity.checked_add(q))
            .ok_or_else(|| self.overflow(quantity))?;
        if self.quantity == 0 {
            self.avg_price = price;
        } else {
            let old_qty = self.quantity as f64;
            let new_qty = quantity as f64;
            self.avg_price = (old_qty * self.avg_price + new_qty * price) / (old_qty + new_qty);
        }
        self.quantity = total;
        Ok(())
    }

    /// Remove sold shares. The cost basis of the remainder is unchanged.
    pub fn reduce(&mut self, quantity: u64) -> Result<(), PositionError> {
        self.quantity = i64::try_from(quantity)
            .ok()
            .and_then(|q| self.quantity.checked_sub(q))
            .ok_or_else(|| self.overflow(quantity))?;
        if self.quantity == 0 {
            self.avg_price = 0.0;
        }
        Ok(())
    }
}
