//! Strategies: stateful signal generators bound to one symbol.
//!
//! Every variant implements the same [`Strategy`] capability: it consumes ticks
//! one at a time, updates its own indicator state, and may emit signals. Each
//! strategy instance also carries the [`Account`] the engine allocates to it.
//! The account is written only by the engine (allocation) and the execution
//! simulator (fills); `generate_signals` may read it but never changes it.

pub mod benchmark;
pub mod factory;
pub mod ma_crossover;
pub mod macd;
pub mod price_ma;
pub mod rsi;
pub mod volatility_breakout;

use crate::domain::{Account, Position, Signal, Tick};
use thiserror::Error;

pub use benchmark::Benchmark;
pub use factory::{create_strategy, FactoryError, StrategySpec, STRATEGY_TYPES};
pub use ma_crossover::MaCrossover;
pub use macd::Macd;
pub use price_ma::PriceMaCrossover;
pub use rsi::RsiReversion;
pub use volatility_breakout::VolatilityBreakout;

/// Quantity carried by every indicator-driven signal.
pub const SIGNAL_QUANTITY: u64 = 1;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StrategyError {
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("signal generation failed: {0}")]
    Evaluation(String),

    #[error("strategy panicked: {0}")]
    Panicked(String),
}

impl StrategyError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Signal-generation capability shared by all strategy variants.
pub trait Strategy: Send {
    /// Strategy identifier; together with the symbol it forms the ledger key.
    fn name(&self) -> &str;

    /// The one symbol this strategy trades. Ticks for other symbols are ignored.
    fn symbol(&self) -> &str;

    /// Consume a tick and return zero or more signals.
    ///
    /// `max_order_volume` is `None` when there is no cap.
    fn generate_signals(
        &mut self,
        tick: &Tick,
        max_order_volume: Option<f64>,
    ) -> Result<Vec<Signal>, StrategyError>;

    fn account(&self) -> &Account;

    fn account_mut(&mut self) -> &mut Account;

    fn remaining_capital(&self) -> f64 {
        self.account().remaining_capital
    }

    fn set_remaining_capital(&mut self, capital: f64) {
        self.account_mut().remaining_capital = capital;
    }

    fn position(&self) -> Position {
        self.account().position
    }
}

pub(crate) fn require_window(name: &'static str, value: usize) -> Result<usize, StrategyError> {
    if value == 0 {
        return Err(StrategyError::invalid(name, "must be >= 1"));
    }
    Ok(value)
}
