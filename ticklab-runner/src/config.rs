//! Serializable backtest configuration (TOML).
//!
//! ```toml
//! [engine]
//! initial_capital = 100000
//! failure_rate = 0.05
//! seed = 42
//!
//! [data]
//! path = "data/market_data.csv"
//!
//! [output]
//! dir = "logs/strategy_data"
//! signals = true
//!
//! [[strategies]]
//! type = "ma_crossover"
//! symbol = "AAPL"
//! short_window = 20
//! long_window = 50
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ticklab_core::domain::ConfigHash;
use ticklab_core::engine::{ConfigError as EngineConfigError, EngineConfig};
use ticklab_core::strategy::StrategySpec;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid engine settings: {0}")]
    Engine(#[from] EngineConfigError),
}

/// Where the ticks come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
}

/// Which ledger logs are persisted, and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub positions: bool,
    pub signals: bool,
    pub orders: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs/strategy_data"),
            positions: true,
            signals: false,
            orders: false,
        }
    }
}

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub strategies: Vec<StrategySpec>,
}

impl BacktestConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            engine: EngineConfig::default(),
            data: DataConfig {
                path: data_path.into(),
            },
            output: OutputConfig::default(),
            strategies: Vec::new(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. A relative `data.path` is resolved against the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if config.data.path.is_relative() {
            if let Some(parent) = path.parent() {
                config.data.path = parent.join(&config.data.path);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        Ok(())
    }

    /// BLAKE3 over the canonical JSON form. Output settings are excluded so
    /// the same experiment written to two places hashes the same.
    pub fn config_hash(&self) -> ConfigHash {
        #[derive(Serialize)]
        struct Canonical<'a> {
            engine: &'a EngineConfig,
            strategies: &'a [StrategySpec],
        }
        let canonical = Canonical {
            engine: &self.engine,
            strategies: &self.strategies,
        };
        // Plain structs of numbers and strings always serialize.
        let json = serde_json::to_vec(&canonical).unwrap_or_default();
        ConfigHash::from_bytes(&json)
    }
}
