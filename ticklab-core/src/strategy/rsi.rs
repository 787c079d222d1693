//! RSI mean reversion: sell overbought, buy oversold.

use crate::domain::{Account, Signal, Tick};
use crate::indicators::{Indicator, Rsi};

use super::{require_window, Strategy, StrategyError, SIGNAL_QUANTITY};

#[derive(Debug, Clone)]
pub struct RsiReversion {
    symbol: String,
    account: Account,
    rsi: Rsi,
    overbought: f64,
    oversold: f64,
}

impl RsiReversion {
    pub const NAME: &'static str = "rsi";

    pub fn new(
        symbol: impl Into<String>,
        period: usize,
        overbought: f64,
        oversold: f64,
    ) -> Result<Self, StrategyError> {
        let period = require_window("period", period)?;
        if !(0.0..=100.0).contains(&overbought) {
            return Err(StrategyError::invalid("overbought", "must be within [0, 100]"));
        }
        if !(0.0..=100.0).contains(&oversold) {
            return Err(StrategyError::invalid("oversold", "must be within [0, 100]"));
        }
        if oversold >= overbought {
            return Err(StrategyError::invalid(
                "oversold",
                format!("must be below overbought ({overbought}), got {oversold}"),
            ));
        }
        Ok(Self {
            symbol: symbol.into(),
            account: Account::default(),
            rsi: Rsi::new(period),
            overbought,
            oversold,
        })
    }

    pub fn default_params(symbol: impl Into<String>) -> Result<Self, StrategyError> {
        Self::new(symbol, 14, 70.0, 30.0)
    }
}

impl Strategy for RsiReversion {
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
        let Some(rsi) = self.rsi.update(tick.price) else {
            return Ok(Vec::new());
        };

        if rsi > self.overbought {
            return Ok(vec![Signal::sell(tick, SIGNAL_QUANTITY, Self::NAME)
                .with_reason(format!("RSI={rsi:.2} > {}", self.overbought))]);
        }
        if rsi < self.oversold {
            return Ok(vec![Signal::buy(tick, SIGNAL_QUANTITY, Self::NAME)
                .with_reason(format!("RSI={rsi:.2} < {}", self.oversold))]);
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
