//! Execution engine: run lifecycle and the tick-by-tick event loop.
//!
//! Lifecycle: NOT_STARTED → LOADING → ALLOCATING → RUNNING → SAVING → DONE.
//!
//! 1. Loading: take the tick stream and stable-sort it by timestamp
//! 2. Allocating: split the initial capital equally, open ledger buckets
//! 3. Running: evaluate strategies, execute orders, snapshot accounts
//! 4. Saving: hand the ledger to a `LedgerSink`

pub mod config;
pub mod event_loop;
pub mod state;

pub use config::{ConfigError, EngineConfig, DEFAULT_VOLUME_PARTICIPATION};
pub use event_loop::{EngineError, ExecutionEngine};
pub use state::{EnginePhase, RunSummary, StrategyOutcome};

use crate::domain::Tick;
use crate::ledger::LedgerSink;
use crate::strategy::Strategy;

/// Drive a fresh engine through every phase.
pub fn run_backtest(
    config: EngineConfig,
    ticks: Vec<Tick>,
    strategies: Vec<Box<dyn Strategy>>,
    sink: &mut dyn LedgerSink,
) -> Result<RunSummary, EngineError> {
    let mut engine = ExecutionEngine::new(config)?;
    engine.load_ticks(ticks)?;
    engine.allocate(strategies)?;
    engine.run()?;
    engine.save(sink)?;
    Ok(engine.summary().clone())
}
