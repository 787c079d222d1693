//! Orders and their single-transition lifecycle.

use super::signal::Side;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order lifecycle states.
///
/// `Pending` moves exactly once to `Filled` or `Failed` and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Filled,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("order for {symbol} is already {from:?}, cannot move to {to:?}")]
    AlreadyTerminal {
        symbol: String,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// A priced, sized trade request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    pub price: f64,
    status: OrderStatus,
}

impl Order {
    /// New orders always start `Pending`.
    pub fn new(symbol: impl Into<String>, side: Side, quantity: u64, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price,
            status: OrderStatus::Pending,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn notional(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    pub fn mark_filled(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Filled)
    }

    pub fn mark_failed(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Failed)
    }

    fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::AlreadyTerminal {
                symbol: self.symbol.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_order_is_pending() {
        let order = Order::new("AAPL", Side::Buy, 10, 50.0);
        assert!(order.is_pending());
        assert_eq!(order.notional(), 500.0);
    }

    #[test]
    fn order_transitions_exactly_once() {
        let mut order = Order::new("AAPL", Side::Buy, 10, 50.0);
        order.mark_filled().unwrap();
        assert_eq!(order.status(), OrderStatus::Filled);

        let err = order.mark_failed().unwrap_err();
        assert_eq!(
            err,
            OrderError::AlreadyTerminal {
                symbol: "AAPL".into(),
                from: OrderStatus::Filled,
                to: OrderStatus::Failed,
            }
        );
        assert_eq!(order.status(), OrderStatus::Filled);
    }

    #[test]
    fn failed_order_cannot_be_filled() {
        let mut order = Order::new("AAPL", Side::Sell, 1, 50.0);
        order.mark_failed().unwrap();
        assert!(order.mark_filled().is_err());
        assert_eq!(order.status(), OrderStatus::Failed);
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Failed).unwrap(),
            "\"FAILED\""
        );
    }
}
