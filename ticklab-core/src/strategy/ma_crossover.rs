//! Moving average crossover: short SMA versus long SMA.
//!
//! BUY when the short average crosses above the long average, SELL when it
//! crosses below. Equal averages never fire.

use crate::domain::{Account, Signal, Tick};
use crate::indicators::{Indicator, Sma};

use super::{require_window, Strategy, StrategyError, SIGNAL_QUANTITY};

#[derive(Debug, Clone)]
pub struct MaCrossover {
    symbol: String,
    account: Account,
    short: Sma,
    long: Sma,
    /// (short, long) from the previous tick, once both were available.
    prev: Option<(f64, f64)>,
}

impl MaCrossover {
    pub const NAME: &'static str = "ma_crossover";

    pub fn new(
        symbol: impl Into<String>,
        short_window: usize,
        long_window: usize,
    ) -> Result<Self, StrategyError> {
        let short_window = require_window("short_window", short_window)?;
        let long_window = require_window("long_window", long_window)?;
        if long_window <= short_window {
            return Err(StrategyError::invalid(
                "long_window",
                format!("must be > short_window ({short_window}), got {long_window}"),
            ));
        }
        Ok(Self {
            symbol: symbol.into(),
            account: Account::default(),
            short: Sma::new(short_window),
            long: Sma::new(long_window),
            prev: None,
        })
    }

    pub fn default_params(symbol: impl Into<String>) -> Result<Self, StrategyError> {
        Self::new(symbol, 20, 50)
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn generate_signals(
        &mut self,
        tick: &Tick,
        _max_order_volume: Option<f64>,
    ) -> Result<Vec<Signal>, StrategyError> {
        if tick.symbol != self.symbol {
            return Ok(Vec::new());
        }

        let short = self.short.update(tick.price);
        let long = self.long.update(tick.price);
        let (Some(short), Some(long)) = (short, long) else {
            return Ok(Vec::new());
        };
        let Some((prev_short, prev_long)) = self.prev.replace((short, long)) else {
            return Ok(Vec::new());
        };

        if prev_short <= prev_long && short > long {
            return Ok(vec![Signal::buy(tick, SIGNAL_QUANTITY, Self::NAME)
                .with_reason(format!("SMA crossover: {short:.2} > {long:.2}"))]);
        }
        if prev_short >= prev_long && short < long {
            return Ok(vec![Signal::sell(tick, SIGNAL_QUANTITY, Self::NAME)
                .with_reason(format!("SMA crossover: {short:.2} < {long:.2}"))]);
        }
        Ok(Vec::new())
    }

    fn account(&self) -> &Account {
        &self.account
    }

    fn account_mut(&mut self) -> &mut Account {
        &mut self.account
    }
}
