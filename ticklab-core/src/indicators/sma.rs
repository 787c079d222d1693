//! Simple Moving Average (SMA).
//!
//! Bounded window with a running sum: O(1) per update, O(period) memory.
//! First reading after `period` observations.

use super::Indicator;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
    window: VecDeque<f64>,
    sum: f64,
}

impl Sma {
    /// `period` must be at least 1; callers validate before constructing.
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("sma_{period}"),
            window: VecDeque::with_capacity(period),
            sum: 0.0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, value: f64) -> Option<f64> {
        if self.window.len() == self.period {
            if let Some(leaving) = self.window.pop_front() {
                self.sum -= leaving;
            }
        }
        self.window.push_back(value);
        self.sum += value;
        self.current()
    }

    fn current(&self) -> Option<f64> {
        if self.is_full() {
            Some(self.sum / self.period as f64)
        } else {
            None
        }
    }
}
