//! Engine lifecycle phases and the run summary.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Position, StrategyKey};
use crate::execution::FailureKind;

/// NOT_STARTED → LOADING → ALLOCATING → RUNNING → SAVING → DONE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnginePhase {
    NotStarted,
    Loading,
    Allocating,
    Running,
    Saving,
    Done,
}

impl EnginePhase {
    /// The phase that follows this one. `Done` is terminal.
    pub fn next(self) -> Option<EnginePhase> {
        match self {
            EnginePhase::NotStarted => Some(EnginePhase::Loading),
            EnginePhase::Loading => Some(EnginePhase::Allocating),
            EnginePhase::Allocating => Some(EnginePhase::Running),
            EnginePhase::Running => Some(EnginePhase::Saving),
            EnginePhase::Saving => Some(EnginePhase::Done),
            EnginePhase::Done => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == EnginePhase::Done
    }
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnginePhase::NotStarted => "NOT_STARTED",
            EnginePhase::Loading => "LOADING",
            EnginePhase::Allocating => "ALLOCATING",
            EnginePhase::Running => "RUNNING",
            EnginePhase::Saving => "SAVING",
            EnginePhase::Done => "DONE",
        };
        f.write_str(s)
    }
}

/// Final state of one strategy slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyOutcome {
    pub key: StrategyKey,
    pub allocated_capital: f64,
    pub remaining_capital: f64,
    pub position: Position,
    pub orders_filled: usize,
    pub orders_failed: usize,
}

/// Counters collected while RUNNING.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks_processed: usize,
    pub signals: usize,
    pub orders_filled: usize,
    pub orders_failed: BTreeMap<FailureKind, usize>,
    pub strategy_faults: usize,
    pub snapshots: usize,
    pub outcomes: Vec<StrategyOutcome>,
}

impl RunSummary {
    pub fn total_failed(&self) -> usize {
        self.orders_failed.values().sum()
    }

    pub fn failed_of(&self, kind: FailureKind) -> usize {
        self.orders_failed.get(&kind).copied().unwrap_or(0)
    }

    pub fn outcome(&self, key: &StrategyKey) -> Option<&StrategyOutcome> {
        self.outcomes.iter().find(|o| &o.key == key)
    }
}
