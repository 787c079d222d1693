//! Backtest runner: wires configuration, data, strategies, engine, and export.
//!
//! Two entry points:
//! - `run_from_config()`: loads ticks from the configured CSV, then runs. Used by the CLI.
//! - `run_loaded()`: takes pre-loaded ticks and an optional log dispatch.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, Dispatch};

use ticklab_core::engine::{EngineError, ExecutionEngine, RunSummary};
use ticklab_core::strategy::{create_strategy, FactoryError, Strategy};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_ticks, LoadError, LoadedTicks};
use crate::export::{write_manifest, JsonLedgerWriter, RunManifest, SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] LoadError),

    #[error("strategy error: {0}")]
    Strategy(#[from] FactoryError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("export error: {0:#}")]
    Export(anyhow::Error),
}

/// Outcome of one backtest, as reported to callers.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub schema_version: u32,
    pub summary: RunSummary,
    pub manifest: RunManifest,
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

pub fn build_strategies(config: &BacktestConfig) -> Result<Vec<Box<dyn Strategy>>, FactoryError> {
    config.strategies.iter().map(create_strategy).collect()
}

pub fn run_from_config(config: &BacktestConfig) -> Result<BacktestReport, RunError> {
    let loaded = load_ticks(&config.data.path)?;
    run_loaded(config, loaded, None)
}

pub fn run_loaded(
    config: &BacktestConfig,
    loaded: LoadedTicks,
    dispatch: Option<Dispatch>,
) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let strategies = build_strategies(config)?;

    let mut engine = ExecutionEngine::new(config.engine.clone())?;
    if let Some(d) = dispatch {
        engine = engine.with_dispatch(d);
    }
    let tick_count = engine.load_ticks(loaded.ticks)?;
    engine.allocate(strategies)?;
    engine.run()?;

    let mut writer = JsonLedgerWriter::new(config.output.clone());
    engine.save(&mut writer)?;

    let summary = engine.summary().clone();
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        config_hash: config.config_hash(),
        dataset_hash: loaded.dataset_hash,
        seed: engine.seed(),
        tick_count,
        strategies: engine.strategies().map(|(key, _)| key.to_string()).collect(),
        summary: serde_json::to_value(&summary)
            .map_err(|e| RunError::Export(anyhow::Error::new(e)))?,
    };
    let manifest_path =
        write_manifest(writer.dir(), &manifest).map_err(RunError::Export)?;

    let mut files = writer.written().to_vec();
    files.push(manifest_path);
    info!(
        dir = %writer.dir().display(),
        files = files.len(),
        config_hash = %manifest.config_hash,
        "Backtest artifacts written"
    );

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        summary,
        manifest,
        output_dir: writer.dir().to_path_buf(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::parse_ticks;
    use ticklab_core::strategy::StrategySpec;

    fn loaded() -> LoadedTicks {
        let csv = "timestamp,symbol,price\n2024-01-02,AAPL,50\n2024-01-03,AAPL,60\n";
        parse_ticks(std::io::Cursor::new(csv.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn unknown_strategy_type_fails_before_running() {
        let mut config = BacktestConfig::new("unused.csv");
        config.strategies.push(StrategySpec::new("astrology", "AAPL"));
        assert!(matches!(
            run_loaded(&config, loaded(), None),
            Err(RunError::Strategy(FactoryError::UnknownStrategy(_)))
        ));
    }

    #[test]
    fn empty_strategy_list_is_an_engine_error() {
        let config = BacktestConfig::new("unused.csv");
        assert!(matches!(
            run_loaded(&config, loaded(), None),
            Err(RunError::Engine(EngineError::NoStrategies))
        ));
    }

    #[test]
    fn benchmark_run_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BacktestConfig::new("unused.csv");
        config.engine.initial_capital = 1_000.0;
        config.engine.seed = Some(3);
        config.output.dir = dir.path().to_path_buf();
        config.strategies.push(StrategySpec::new("benchmark", "AAPL"));

        let report = run_loaded(&config, loaded(), None).unwrap();
        assert_eq!(report.summary.orders_filled, 1);
        assert_eq!(report.manifest.seed, 3);
        assert_eq!(report.manifest.tick_count, 2);
        assert_eq!(report.manifest.strategies, vec!["benchmark_AAPL".to_string()]);
        assert_eq!(report.files.len(), 2); // positions.json + manifest.json
        assert!(dir.path().join("manifest.json").exists());
    }
}
