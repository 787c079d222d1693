//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: SMA of the first `period` observations.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
    alpha: f64,
    seed_sum: f64,
    seen: usize,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("ema_{period}"),
            alpha: 2.0 / (period as f64 + 1.0),
            seed_sum: 0.0,
            seen: 0,
            value: None,
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, value: f64) -> Option<f64> {
        match self.value {
            Some(prev) => {
                self.value = Some(value * self.alpha + prev * (1.0 - self.alpha));
            }
            None => {
                self.seed_sum += value;
                self.seen += 1;
                if self.seen == self.period {
                    self.value = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.value
    }

    fn current(&self) -> Option<f64> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_seeds_with_sma() {
        let mut ema = Ema::new(3);
        assert_eq!(ema.update(1.0), None);
        assert_eq!(ema.update(2.0), None);
        assert_approx(ema.update(3.0).unwrap(), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_recursion() {
        let mut ema = Ema::new(3);
        for p in [1.0, 2.0, 3.0] {
            ema.update(p);
        }
        // alpha = 0.5: 0.5 * 7 + 0.5 * 2 = 4.5
        assert_approx(ema.update(7.0).unwrap(), 4.5, DEFAULT_EPSILON);
        assert_approx(ema.current().unwrap(), 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn constant_series_converges_to_constant() {
        let mut ema = Ema::new(12);
        let mut last = None;
        for _ in 0..50 {
            last = ema.update(42.0);
        }
        assert_approx(last.unwrap(), 42.0, DEFAULT_EPSILON);
    }
}
