//! Execution simulator: fills one order against one strategy account.
//!
//! Order of checks:
//! 1. Preconditions (pending order, quantity in 1..=i64::MAX, positive finite price)
//! 2. Failure draw against `failure_rate`
//! 3. BUY affordability or SELL inventory
//!
//! The account is updated as a whole or not at all.

use rand::Rng;

use crate::domain::{Account, Order, Side};

use super::ExecutionError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionSimulator {
    failure_rate: f64,
    short_positions: bool,
}

impl ExecutionSimulator {
    /// `failure_rate` is clamped to [0, 1]. `short_positions` is recorded but
    /// does not relax the inventory check.
    pub fn new(failure_rate: f64, short_positions: bool) -> Self {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        Self {
            failure_rate,
            short_positions,
        }
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    pub fn short_positions(&self) -> bool {
        self.short_positions
    }

    /// Execute `order` against `account`.
    ///
    /// On success the order is `Filled` and the account reflects the trade.
    /// On error neither is touched; the caller marks the order `Failed`.
    pub fn execute<R: Rng + ?Sized>(
        &self,
        order: &mut Order,
        account: &mut Account,
        rng: &mut R,
    ) -> Result<(), ExecutionError> {
        check_preconditions(order)?;

        if self.failure_rate > 0.0 && rng.gen::<f64>() < self.failure_rate {
            return Err(ExecutionError::SimulatedFailure {
                symbol: order.symbol.clone(),
            });
        }

        let mut next = *account;
        let notional = order.notional();
        match order.side {
            Side::Buy => {
                if notional > next.remaining_capital {
                    return Err(ExecutionError::InsufficientCapital {
                        required: notional,
                        available: next.remaining_capital,
                    });
                }
                next.remaining_capital -= notional;
                next.position
                    .add(order.quantity, order.price)
                    .map_err(|e| ExecutionError::InvariantViolation(e.to_string()))?;
            }
            Side::Sell => {
                let held = next.position.quantity;
                if i64::try_from(order.quantity).map_or(true, |q| q > held) {
                    return Err(ExecutionError::InsufficientInventory {
                        requested: order.quantity,
                        held,
                    });
                }
                next.remaining_capital += notional;
                next.position
                    .reduce(order.quantity)
                    .map_err(|e| ExecutionError::InvariantViolation(e.to_string()))?;
            }
        }

        order
            .mark_filled()
            .map_err(|e| ExecutionError::InvariantViolation(e.to_string()))?;
        *account = next;
        Ok(())
    }
}

impl Default for ExecutionSimulator {
    fn default() -> Self {
        Self::new(0.0, false)
    }
}

fn check_preconditions(order: &Order) -> Result<(), ExecutionError> {
    if !order.is_pending() {
        return Err(ExecutionError::InvariantViolation(format!(
            "order for {} is {:?}, expected Pending",
            order.symbol,
            order.status()
        )));
    }
    if order.quantity == 0 {
        return Err(ExecutionError::InvariantViolation(format!(
            "order for {} has zero quantity",
            order.symbol
        )));
    }
    if i64::try_from(order.quantity).is_err() {
        return Err(ExecutionError::InvariantViolation(format!(
            "order for {} has quantity {} beyond the position range",
            order.symbol, order.quantity
        )));
    }
    if !(order.price.is_finite() && order.price > 0.0) {
        return Err(ExecutionError::InvariantViolation(format!(
            "order for {} has unusable price {}",
            order.symbol, order.price
        )));
    }
    Ok(())
}
