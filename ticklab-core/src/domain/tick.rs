//! Tick: one timestamped price observation for a symbol.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Immutable price observation.
///
/// `daily_volume` is optional; when absent no order-volume cap applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: NaiveDateTime,
    pub symbol: String,
    pub price: f64,
    pub daily_volume: Option<f64>,
}

impl Tick {
    pub fn new(timestamp: NaiveDateTime, symbol: impl Into<String>, price: f64) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            price,
            daily_volume: None,
        }
    }

    pub fn with_volume(mut self, daily_volume: f64) -> Self {
        self.daily_volume = Some(daily_volume);
        self
    }

    /// Maximum order volume for this tick: a fraction of the day's traded volume.
    ///
    /// Returns `None` (no cap) when the volume is missing or not a usable number.
    pub fn max_order_volume(&self, participation: f64) -> Option<f64> {
        self.daily_volume
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v * participation)
    }

    /// A tick with a zero, negative, or non-finite price cannot be traded at.
    pub fn is_tradable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Stable sort by timestamp. Ticks sharing a timestamp keep their input order.
pub fn sort_ticks(ticks: &mut [Tick]) {
    ticks.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}

/// Canonical textual form used in every persisted record.
///
/// `YYYY-MM-DDTHH:MM:SS`, with fractional seconds only when non-zero.
pub fn canonical_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
