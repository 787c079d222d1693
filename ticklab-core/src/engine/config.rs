//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Share of a tick's daily volume a single order may take.
pub const DEFAULT_VOLUME_PARTICIPATION: f64 = 0.075;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("failure_rate must be within [0, 1], got {0}")]
    FailureRate(f64),

    #[error("initial_capital must be positive and finite, got {0}")]
    InitialCapital(f64),

    #[error("volume_participation must be within (0, 1], got {0}")]
    VolumeParticipation(f64),
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Probability that an otherwise valid execution fails.
    pub failure_rate: f64,
    /// Split equally across all (strategy, symbol) pairs.
    pub initial_capital: f64,
    /// Accepted but inert: SELLs are still limited to held inventory.
    pub short_positions: bool,
    pub volume_participation: f64,
    /// Master seed for failure draws. `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.0,
            initial_capital: 100_000.0,
            short_positions: false,
            volume_participation: DEFAULT_VOLUME_PARTICIPATION,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            ..Self::default()
        }
    }

    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ConfigError::FailureRate(self.failure_rate));
        }
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::InitialCapital(self.initial_capital));
        }
        if !(self.volume_participation > 0.0 && self.volume_participation <= 1.0) {
            return Err(ConfigError::VolumeParticipation(self.volume_participation));
        }
        Ok(())
    }
}
