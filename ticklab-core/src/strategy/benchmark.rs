//! Buy-and-hold benchmark: spend the allocation once, then stay silent.

use crate::domain::{Account, Signal, Tick};

use super::{Strategy, StrategyError};

/// Largest share count that converts exactly between `f64` and `i64`.
const MAX_SHARES: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone)]
pub struct Benchmark {
    symbol: String,
    account: Account,
    fired: bool,
}

impl Benchmark {
    pub const NAME: &'static str = "benchmark";

    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            account: Account::default(),
            fired: false,
        }
    }

    /// Shares affordable at `price`, capped by the order volume limit.
    ///
    /// The notional is checked the way the simulator checks it, so the
    /// rounded-down quantity never costs more than the remaining capital.
    fn entry_quantity(&self, price: f64, max_order_volume: Option<f64>) -> u64 {
        let capital = self.account.remaining_capital;
        let mut shares = (capital / price).floor().min(MAX_SHARES);
        if let Some(cap) = max_order_volume {
            shares = shares.min(cap.floor());
        }
        if !(shares.is_finite() && shares > 0.0) {
            return 0;
        }
        let mut quantity = shares as u64;
        while quantity > 0 && quantity as f64 * price > capital {
            quantity -= 1;
        }
        quantity
    }
}

impl Strategy for Benchmark {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn generate_signals(
        &mut self,
        tick: &Tick,
        max_order_volume: Option<f64>,
    ) -> Result<Vec<Signal>, StrategyError> {
        if self.fired || tick.symbol != self.symbol || !tick.is_tradable() {
            return Ok(Vec::new());
        }
        self.fired = true;

        let quantity = self.entry_quantity(tick.price, max_order_volume);
        if quantity == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![Signal::buy(tick, quantity, Self::NAME)
            .with_reason(format!("Benchmark entry: {quantity} @ {:.2}", tick.price))])
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
    use crate::strategy::test_support::{day, replay, ticks};

    fn funded(capital: f64) -> Benchmark {
        let mut b = Benchmark::new("AAPL");
        b.set_remaining_capital(capital);
        b
    }

    #[test]
    fn buys_once_with_all_capital() {
        let mut b = funded(1_000.0);
        let signals = replay(&mut b, &ticks("AAPL", &[30.0, 10.0, 5.0]));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].0, 0);
        assert_eq!(signals[0].1.quantity, 33);
    }

    #[test]
    fn volume_cap_limits_quantity() {
        let mut b = funded(1_000.0);
        let tick = Tick::new(day(0), "AAPL", 10.0);
        let signals = b.generate_signals(&tick, Some(7.5)).unwrap();
        assert_eq!(signals[0].quantity, 7);
    }

    #[test]
    fn skips_untradable_prices() {
        let mut b = funded(1_000.0);
        let signals = replay(&mut b, &ticks("AAPL", &[0.0, 50.0]));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].0, 1);
        assert_eq!(signals[0].1.quantity, 20);
    }

    #[test]
    fn rounded_down_quantity_stays_affordable() {
        let mut b = funded(14_617.38);
        let tick = Tick::new(day(0), "AAPL", 0.01);
        let signals = b.generate_signals(&tick, None).unwrap();
        let q = signals[0].quantity;
        assert!(q as f64 * 0.01 <= 14_617.38);
        assert_eq!(q, 1_461_737);
    }

    #[test]
    fn huge_capital_is_capped_to_exact_share_count() {
        let mut b = funded(1e18);
        let tick = Tick::new(day(0), "AAPL", 0.01);
        let signals = b.generate_signals(&tick, None).unwrap();
        assert_eq!(signals[0].quantity, 1 << 53);
        assert!(i64::try_from(signals[0].quantity).is_ok());
    }

    #[test]
    fn unaffordable_entry_emits_nothing_and_stays_silent() {
        let mut b = funded(5.0);
        assert!(replay(&mut b, &ticks("AAPL", &[10.0, 1.0])).is_empty());
    }
}
