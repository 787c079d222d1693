//! Price versus moving average crossover.
//!
//! Compares each price against the average of the preceding `window_size`
//! prices. BUY when the price moves from at-or-below the average to above it,
//! SELL when it moves from at-or-above to below. The average is maintained
//! with a bounded window and running sum, so memory stays O(window_size).

use std::cmp::Ordering;

use crate::domain::{Account, Signal, Tick};
use crate::indicators::{Indicator, Sma};

use super::{require_window, Strategy, StrategyError, SIGNAL_QUANTITY};

#[derive(Debug, Clone)]
pub struct PriceMaCrossover {
    symbol: String,
    account: Account,
    sma: Sma,
    prev_relation: Option<Ordering>,
}

impl PriceMaCrossover {
    pub const NAME: &'static str = "price_ma_crossover";

    pub fn new(symbol: impl Into<String>, window_size: usize) -> Result<Self, StrategyError> {
        let window_size = require_window("window_size", window_size)?;
        Ok(Self {
            symbol: symbol.into(),
            account: Account::default(),
            sma: Sma::new(window_size),
            prev_relation: None,
        })
    }

    pub fn default_params(symbol: impl Into<String>) -> Result<Self, StrategyError> {
        Self::new(symbol, 40)
    }

    pub fn window_size(&self) -> usize {
        self.sma.period()
    }
}

impl Strategy for PriceMaCrossover {
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

        let prev_ma = self.sma.current();
        self.sma.update(tick.price);
        let Some(ma) = prev_ma else {
            return Ok(Vec::new());
        };
        let Some(relation) = tick.price.partial_cmp(&ma) else {
            self.prev_relation = None;
            return Ok(Vec::new());
        };
        let Some(prev) = self.prev_relation.replace(relation) else {
            return Ok(Vec::new());
        };

        let price = tick.price;
        let signal = match (prev, relation) {
            (Ordering::Less | Ordering::Equal, Ordering::Greater) => Some(
                Signal::buy(tick, SIGNAL_QUANTITY, Self::NAME)
                    .with_reason(format!("Price crossover: {price:.2} > MA {ma:.2}")),
            ),
            (Ordering::Greater | Ordering::Equal, Ordering::Less) => Some(
                Signal::sell(tick, SIGNAL_QUANTITY, Self::NAME)
                    .with_reason(format!("Price crossover: {price:.2} < MA {ma:.2}")),
            ),
            _ => None,
        };
        Ok(signal.into_iter().collect())
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
    fn zero_window_is_rejected() {
        assert!(PriceMaCrossover::new("AAPL", 0).is_err());
    }

    #[test]
    fn fires_only_on_flips() {
        let mut strat = PriceMaCrossover::new("AAPL", 3).unwrap();
        // idx3: 9 < 10 ; idx4: 12 > 9.67 → BUY ; idx5: 13 > 10.33 ; idx6: 8 < 11.33 → SELL
        let prices = [10.0, 10.0, 10.0, 9.0, 12.0, 13.0, 8.0];
        let signals = replay(&mut strat, &ticks("AAPL", &prices));
        let summary: Vec<(usize, Side)> = signals.iter().map(|(i, s)| (*i, s.side)).collect();
        assert_eq!(summary, vec![(4, Side::Buy), (6, Side::Sell)]);
    }

    #[test]
    fn needs_window_before_any_signal() {
        let mut strat = PriceMaCrossover::new("AAPL", 5).unwrap();
        let prices = [1.0, 9.0, 1.0, 9.0, 1.0];
        assert!(replay(&mut strat, &ticks("AAPL", &prices)).is_empty());
    }

    #[test]
    fn sustained_trend_does_not_repeat() {
        let mut strat = PriceMaCrossover::new("AAPL", 3).unwrap();
        let mut prices = vec![10.0, 10.0, 10.0, 9.0];
        prices.extend((0..30).map(|i| 11.0 + i as f64));
        let signals = replay(&mut strat, &ticks("AAPL", &prices));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].1.side, Side::Buy);
    }

    #[test]
    fn tie_with_average_is_silent() {
        let mut strat = PriceMaCrossover::new("AAPL", 2).unwrap();
        let prices = [10.0, 10.0, 10.0, 10.0];
        assert!(replay(&mut strat, &ticks("AAPL", &prices)).is_empty());
    }
}
