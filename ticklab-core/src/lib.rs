//! TickLab Core: single-stream backtesting accounting engine.
//!
//! This crate contains:
//! - Domain types (ticks, signals, orders, positions, accounts, ledger keys)
//! - Streaming indicators (SMA, EMA, RSI, return volatility)
//! - The `Strategy` capability, its rule variants, and a factory
//! - Signal → order translation and the execution simulator
//! - The append-on-change strategy ledger and its JSON-safe rendering
//! - The engine state machine that ties them together

pub mod domain;
pub mod engine;
pub mod execution;
pub mod indicators;
pub mod ledger;
pub mod rng;
pub mod strategy;

pub use engine::{run_backtest, EngineConfig, EngineError, EnginePhase, ExecutionEngine, RunSummary};
