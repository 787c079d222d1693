//! Signals: a strategy's expressed intent to trade.

use super::tick::Tick;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Immutable intent record emitted by a strategy.
///
/// Signals carry no price: the translator prices the resulting order at the
/// triggering tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    pub symbol: String,
    pub side: Side,
    pub quantity: u64,
    /// Identifier of the originating strategy.
    pub strategy: String,
    pub reason: Option<String>,
}

impl Signal {
    pub fn new(tick: &Tick, side: Side, quantity: u64, strategy: &str) -> Self {
        Self {
            timestamp: tick.timestamp,
            symbol: tick.symbol.clone(),
            side,
            quantity,
            strategy: strategy.to_string(),
            reason: None,
        }
    }

    pub fn buy(tick: &Tick, quantity: u64, strategy: &str) -> Self {
        Self::new(tick, Side::Buy, quantity, strategy)
    }

    pub fn sell(tick: &Tick, quantity: u64, strategy: &str) -> Self {
        Self::new(tick, Side::Sell, quantity, strategy)
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
