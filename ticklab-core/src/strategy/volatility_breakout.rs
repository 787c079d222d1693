//! Volatility breakout.
//!
//! Compares today's simple return against the population standard deviation
//! of the `lookback` returns before it. BUY when the return exceeds the band
//! while flat; SELL when it drops below the negative band while long.

use crate::domain::{Account, Signal, Tick};
use crate::indicators::{Indicator, ReturnVolatility};

use super::{require_window, Strategy, StrategyError, SIGNAL_QUANTITY};

#[derive(Debug, Clone)]
pub struct VolatilityBreakout {
    symbol: String,
    account: Account,
    volatility: ReturnVolatility,
    long: bool,
}

impl VolatilityBreakout {
    pub const NAME: &'static str = "volatility_breakout";

    pub fn new(symbol: impl Into<String>, lookback: usize) -> Result<Self, StrategyError> {
        let lookback = require_window("lookback", lookback)?;
        Ok(Self {
            symbol: symbol.into(),
            account: Account::default(),
            volatility: ReturnVolatility::new(lookback),
            long: false,
        })
    }

    pub fn default_params(symbol: impl Into<String>) -> Result<Self, StrategyError> {
        Self::new(symbol, 20)
    }
}

impl Strategy for VolatilityBreakout {
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

        // Band and return are read before today's return joins the history.
        let today = self.volatility.pending_return(tick.price);
        let band = self.volatility.current();
        self.volatility.update(tick.price);

        let (Some(r), Some(band)) = (today, band) else {
            return Ok(Vec::new());
        };

        if !self.long && r > band {
            self.long = true;
            return Ok(vec![Signal::buy(tick, SIGNAL_QUANTITY, Self::NAME)
                .with_reason(format!("Return={r:.4} > RollingStd={band:.4}"))]);
        }
        if self.long && r < -band {
            self.long = false;
            return Ok(vec![Signal::sell(tick, SIGNAL_QUANTITY, Self::NAME)
                .with_reason(format!("Return={r:.4} < -RollingStd={:.4}", -band))]);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use crate::strategy::test_support::{replay, ticks};

    #[test]
    fn quiet_market_then_breakout() {
        let mut strat = VolatilityBreakout::new("AAPL", 3).unwrap();
        // Flat prices: band 0. +10% at idx 4 breaks out, -10% at idx 6 exits.
        let prices = [100.0, 100.0, 100.0, 100.0, 110.0, 110.0, 99.0];
        let signals = replay(&mut strat, &ticks("AAPL", &prices));
        let summary: Vec<(usize, Side)> = signals.iter().map(|(i, s)| (*i, s.side)).collect();
        assert_eq!(summary, vec![(4, Side::Buy), (6, Side::Sell)]);
    }

    #[test]
    fn needs_lookback_prior_returns() {
        let mut strat = VolatilityBreakout::new("AAPL", 3).unwrap();
        // Only two prior returns exist at idx 3.
        let prices = [100.0, 100.0, 100.0, 150.0];
        assert!(replay(&mut strat, &ticks("AAPL", &prices)).is_empty());
    }

    #[test]
    fn zero_previous_close_yields_no_decision() {
        let mut strat = VolatilityBreakout::new("AAPL", 2).unwrap();
        let prices = [100.0, 100.0, 100.0, 0.0, 50.0];
        // idx 4 follows a zero close: no decision.
        assert!(replay(&mut strat, &ticks("AAPL", &prices)).is_empty());
    }
}
