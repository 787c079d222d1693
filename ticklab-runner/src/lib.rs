//! TickLab Runner: the collaborators around the core engine.
//!
//! This crate builds on `ticklab-core` to provide:
//! - TOML backtest configuration with a reproducibility hash
//! - CSV tick loading with dataset fingerprinting
//! - JSON ledger persistence and the run manifest
//! - The `run_from_config` orchestration entry point

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, DataConfig, OutputConfig};
pub use data_loader::{load_ticks, parse_ticks, LoadError, LoadedTicks};
pub use export::{JsonLedgerWriter, RunManifest, SCHEMA_VERSION};
pub use runner::{build_strategies, run_from_config, run_loaded, BacktestReport, RunError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<RunManifest>();
        assert_sync::<RunManifest>();
    }

    #[test]
    fn report_is_send() {
        assert_send::<BacktestReport>();
        assert_send::<LoadedTicks>();
    }
}
