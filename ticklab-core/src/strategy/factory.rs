//! Factory: turns a declarative `StrategySpec` into a boxed strategy.
//!
//! Unknown parameters are ignored; missing ones fall back to the variant's
//! defaults. Window lengths must be non-negative integers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    Benchmark, Macd, MaCrossover, PriceMaCrossover, RsiReversion, Strategy, StrategyError,
    VolatilityBreakout,
};

/// Every strategy type the factory understands.
pub const STRATEGY_TYPES: &[&str] = &[
    MaCrossover::NAME,
    PriceMaCrossover::NAME,
    RsiReversion::NAME,
    Macd::NAME,
    VolatilityBreakout::NAME,
    Benchmark::NAME,
];

// ─── Spec ────────────────────────────────────────────────────────────

/// Declarative description of one strategy instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySpec {
    #[serde(rename = "type")]
    pub strategy_type: String,
    pub symbol: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, f64>,
}

impl StrategySpec {
    pub fn new(strategy_type: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            strategy_type: strategy_type.into(),
            symbol: symbol.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("Unknown strategy type: {0}")]
    UnknownStrategy(String),

    #[error("Parameter '{name}' must be a non-negative integer, got {value}")]
    NotAnInteger { name: String, value: f64 },

    #[error("Invalid configuration for {strategy} on {symbol}: {source}")]
    Strategy {
        strategy: String,
        symbol: String,
        #[source]
        source: StrategyError,
    },
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn param(spec: &StrategySpec, name: &str, default: f64) -> f64 {
    spec.params.get(name).copied().unwrap_or(default)
}

fn param_usize(spec: &StrategySpec, name: &str, default: usize) -> Result<usize, FactoryError> {
    match spec.params.get(name).copied() {
        None => Ok(default),
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
        Some(v) => Err(FactoryError::NotAnInteger {
            name: name.to_string(),
            value: v,
        }),
    }
}

// ─── Strategy factory ────────────────────────────────────────────────

/// Build a strategy from its spec. The account starts empty; capital is
/// assigned by the engine at allocation.
pub fn create_strategy(spec: &StrategySpec) -> Result<Box<dyn Strategy>, FactoryError> {
    let symbol = spec.symbol.clone();
    let built: Result<Box<dyn Strategy>, StrategyError> = match spec.strategy_type.as_str() {
        MaCrossover::NAME => MaCrossover::new(
            symbol,
            param_usize(spec, "short_window", 20)?,
            param_usize(spec, "long_window", 50)?,
        )
        .map(|s| Box::new(s) as Box<dyn Strategy>),
        PriceMaCrossover::NAME => {
            PriceMaCrossover::new(symbol, param_usize(spec, "window_size", 40)?)
                .map(|s| Box::new(s) as Box<dyn Strategy>)
        }
        RsiReversion::NAME => RsiReversion::new(
            symbol,
            param_usize(spec, "period", 14)?,
            param(spec, "overbought", 70.0),
            param(spec, "oversold", 30.0),
        )
        .map(|s| Box::new(s) as Box<dyn Strategy>),
        Macd::NAME => Macd::new(
            symbol,
            param_usize(spec, "fast_period", 12)?,
            param_usize(spec, "slow_period", 26)?,
            param_usize(spec, "signal_period", 9)?,
        )
        .map(|s| Box::new(s) as Box<dyn Strategy>),
        VolatilityBreakout::NAME => {
            VolatilityBreakout::new(symbol, param_usize(spec, "lookback", 20)?)
                .map(|s| Box::new(s) as Box<dyn Strategy>)
        }
        Benchmark::NAME => Ok(Box::new(Benchmark::new(symbol))),
        other => return Err(FactoryError::UnknownStrategy(other.to_string())),
    };

    built.map_err(|source| FactoryError::Strategy {
        strategy: spec.strategy_type.clone(),
        symbol: spec.symbol.clone(),
        source,
    })
}
