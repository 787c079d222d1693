//! Relative Strength Index (RSI).
//!
//! Simple average of gains and losses over the last `period` price changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Needs `period + 1` prices. A zero average loss saturates at 100.

use super::Indicator;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
    prev_price: Option<f64>,
    changes: VecDeque<f64>,
    value: Option<f64>,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("rsi_{period}"),
            prev_price: None,
            changes: VecDeque::with_capacity(period),
            value: None,
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + 1
    }

    fn update(&mut self, value: f64) -> Option<f64> {
        if let Some(prev) = self.prev_price {
            if self.changes.len() == self.period {
                self.changes.pop_front();
            }
            self.changes.push_back(value - prev);
        }
        self.prev_price = Some(value);

        if self.changes.len() < self.period {
            return None;
        }

        let (gains, losses) = self.changes.iter().fold((0.0, 0.0), |(g, l), &ch| {
            if ch > 0.0 {
                (g + ch, l)
            } else {
                (g, l - ch)
            }
        });
        self.value = Some(compute_rsi(
            gains / self.period as f64,
            losses / self.period as f64,
        ));
        self.value
    }

    fn current(&self) -> Option<f64> {
        self.value
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
