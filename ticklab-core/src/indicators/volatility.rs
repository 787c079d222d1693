//! Rolling volatility of simple returns.
//!
//! Tracks the population standard deviation of the last `lookback` returns.
//! `update` takes a price, so the first reading needs `lookback + 1` prices.
//! A zero previous price contributes a 0.0 return.

use super::Indicator;
use std::collections::VecDeque;

/// Population standard deviation (divides by n, not n - 1).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}

#[derive(Debug, Clone)]
pub struct ReturnVolatility {
    lookback: usize,
    name: String,
    prev_price: Option<f64>,
    returns: VecDeque<f64>,
}

impl ReturnVolatility {
    pub fn new(lookback: usize) -> Self {
        let lookback = lookback.max(1);
        Self {
            lookback,
            name: format!("return_std_{lookback}"),
            prev_price: None,
            returns: VecDeque::with_capacity(lookback),
        }
    }

    /// Simple return from the last seen price to `price`.
    ///
    /// `None` before the first price and when the last price was zero.
    pub fn pending_return(&self, price: f64) -> Option<f64> {
        match self.prev_price {
            Some(prev) if prev != 0.0 => Some((price - prev) / prev),
            _ => None,
        }
    }
}

impl Indicator for ReturnVolatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.lookback + 1
    }

    fn update(&mut self, value: f64) -> Option<f64> {
        if self.prev_price.is_some() {
            let r = self.pending_return(value).unwrap_or(0.0);
            if self.returns.len() == self.lookback {
                self.returns.pop_front();
            }
            self.returns.push_back(r);
        }
        self.prev_price = Some(value);
        self.current()
    }

    fn current(&self) -> Option<f64> {
        if self.returns.len() < self.lookback {
            return None;
        }
        let (a, b) = self.returns.as_slices();
        let values: Vec<f64> = a.iter().chain(b).copied().collect();
        Some(population_std(&values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn population_std_known_value() {
        // mean 5, squared deviations sum 32, n 8 → var 4 → std 2
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_approx(population_std(&v), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn constant_returns_have_zero_volatility() {
        let mut vol = ReturnVolatility::new(3);
        let mut out = None;
        for p in [100.0, 110.0, 121.0, 133.1] {
            out = vol.update(p);
        }
        assert_approx(out.unwrap(), 0.0, 1e-9);
    }

    #[test]
    fn needs_lookback_plus_one_prices() {
        let mut vol = ReturnVolatility::new(2);
        assert_eq!(vol.update(100.0), None);
        assert_eq!(vol.update(101.0), None);
        assert!(vol.update(102.0).is_some());
    }

    #[test]
    fn zero_previous_price_records_zero_return() {
        let mut vol = ReturnVolatility::new(2);
        vol.update(0.0);
        assert_eq!(vol.pending_return(10.0), None);
        vol.update(10.0);
        vol.update(10.0);
        // returns: [0.0 (from zero price), 0.0]
        assert_approx(vol.current().unwrap(), 0.0, DEFAULT_EPSILON);
    }
}
