//! Streaming indicator implementations.
//!
//! Strategies see one price at a time, so every indicator here is an
//! incremental accumulator: `update` folds in the next observation and
//! returns the current reading once enough history exists.

pub mod ema;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use ema::Ema;
pub use rsi::Rsi;
pub use sma::Sma;
pub use volatility::{population_std, ReturnVolatility};

/// Incremental single-series indicator.
pub trait Indicator {
    /// Short name including parameters (e.g. `sma_20`).
    fn name(&self) -> &str;

    /// Number of observations consumed before the first reading.
    fn lookback(&self) -> usize;

    /// Fold in the next observation and return the current reading, if any.
    fn update(&mut self, value: f64) -> Option<f64>;

    /// Most recent reading without consuming a new observation.
    fn current(&self) -> Option<f64>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
