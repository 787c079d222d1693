//! Ledger record types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Account, Order, OrderStatus, Side, Signal};
use crate::execution::FailureKind;

/// Capital and holding of one strategy at a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub timestamp: NaiveDateTime,
    pub qty: i64,
    pub avg_price: f64,
    pub remaining_cash: f64,
}

impl PositionSnapshot {
    pub fn from_account(timestamp: NaiveDateTime, account: &Account) -> Self {
        Self {
            timestamp,
            qty: account.position.quantity,
            avg_price: account.position.avg_price,
            remaining_cash: account.remaining_capital,
        }
    }

    /// Same holding and cash, regardless of when it was observed.
    pub fn same_state(&self, other: &PositionSnapshot) -> bool {
        self.qty == other.qty
            && self.avg_price == other.avg_price
            && self.remaining_cash == other.remaining_cash
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub timestamp: NaiveDateTime,
    pub side: Side,
    pub quantity: u64,
    /// Price of the triggering tick.
    pub price: f64,
    pub strategy: String,
    pub reason: Option<String>,
}

impl SignalRecord {
    pub fn new(signal: &Signal, price: f64) -> Self {
        Self {
            timestamp: signal.timestamp,
            side: signal.side,
            quantity: signal.quantity,
            price,
            strategy: signal.strategy.clone(),
            reason: signal.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub timestamp: NaiveDateTime,
    pub side: Side,
    pub symbol: String,
    pub quantity: u64,
    pub price: f64,
    pub status: OrderStatus,
    pub failure: Option<FailureKind>,
}

impl OrderRecord {
    pub fn new(timestamp: NaiveDateTime, order: &Order, failure: Option<FailureKind>) -> Self {
        Self {
            timestamp,
            side: order.side,
            symbol: order.symbol.clone(),
            quantity: order.quantity,
            price: order.price,
            status: order.status(),
            failure,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Position, Tick};
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn same_state_ignores_timestamp() {
        let account = Account {
            remaining_capital: 9_500.0,
            position: Position { quantity: 10, avg_price: 50.0 },
        };
        let a = PositionSnapshot::from_account(ts(2), &account);
        let b = PositionSnapshot::from_account(ts(3), &account);
        assert!(a.same_state(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn signal_record_carries_tick_price() {
        let tick = Tick::new(ts(2), "AAPL", 123.5);
        let signal = Signal::buy(&tick, 2, "macd").with_reason("MACD crossover");
        let rec = SignalRecord::new(&signal, tick.price);
        assert_eq!(rec.price, 123.5);
        assert_eq!(rec.strategy, "macd");
        assert_eq!(rec.reason.as_deref(), Some("MACD crossover"));
    }

    #[test]
    fn order_record_reflects_terminal_status() {
        let mut order = Order::new("AAPL", Side::Buy, 1, 10.0);
        order.mark_failed().unwrap();
        let rec = OrderRecord::new(ts(2), &order, Some(FailureKind::InsufficientCapital));
        assert!(!rec.is_filled());
        assert_eq!(rec.status, OrderStatus::Failed);
    }
}
