//! MACD trend follower.
//!
//! MACD line = EMA(fast) - EMA(slow); the signal line is an EMA of the MACD
//! line. BUY when MACD crosses above the signal line while flat, SELL when it
//! crosses below while long.

use crate::domain::{Account, Signal, Tick};
use crate::indicators::{Ema, Indicator};

use super::{require_window, Strategy, StrategyError, SIGNAL_QUANTITY};

#[derive(Debug, Clone)]
pub struct Macd {
    symbol: String,
    account: Account,
    fast: Ema,
    slow: Ema,
    signal: Ema,
    /// (macd, signal line) from the previous evaluation.
    prev: Option<(f64, f64)>,
    long: bool,
}

impl Macd {
    pub const NAME: &'static str = "macd";

    pub fn new(
        symbol: impl Into<String>,
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, StrategyError> {
        let fast_period = require_window("fast_period", fast_period)?;
        let slow_period = require_window("slow_period", slow_period)?;
        let signal_period = require_window("signal_period", signal_period)?;
        if fast_period >= slow_period {
            return Err(StrategyError::invalid(
                "fast_period",
                format!("must be below slow_period ({slow_period}), got {fast_period}"),
            ));
        }
        Ok(Self {
            symbol: symbol.into(),
            account: Account::default(),
            fast: Ema::new(fast_period),
            slow: Ema::new(slow_period),
            signal: Ema::new(signal_period),
            prev: None,
            long: false,
        })
    }

    pub fn default_params(symbol: impl Into<String>) -> Result<Self, StrategyError> {
        Self::new(symbol, 12, 26, 9)
    }

    /// Whether the strategy believes it is holding an entry.
    pub fn is_long(&self) -> bool {
        self.long
    }
}

impl Strategy for Macd {
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

        let fast = self.fast.update(tick.price);
        let slow = self.slow.update(tick.price);
        let (Some(fast), Some(slow)) = (fast, slow) else {
            return Ok(Vec::new());
        };

        let macd = fast - slow;
        let Some(line) = self.signal.update(macd) else {
            self.prev = None;
            return Ok(Vec::new());
        };
        let Some((prev_macd, prev_line)) = self.prev.replace((macd, line)) else {
            return Ok(Vec::new());
        };

        if !self.long && prev_macd <= prev_line && macd > line {
            self.long = true;
            return Ok(vec![Signal::buy(tick, SIGNAL_QUANTITY, Self::NAME)
                .with_reason(format!("MACD crossover: {macd:.6} > {line:.6}"))]);
        }
        if self.long && prev_macd >= prev_line && macd < line {
            self.long = false;
            return Ok(vec![Signal::sell(tick, SIGNAL_QUANTITY, Self::NAME)
                .with_reason(format!("MACD crossunder: {macd:.6} < {line:.6}"))]);
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
