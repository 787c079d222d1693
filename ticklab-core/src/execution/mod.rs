//! Execution: turns signals into orders and simulates their fills.
//!
//! Key concepts:
//! - **Translation**: a signal becomes a `Pending` order priced at its tick
//! - **Failure injection**: each execution may fail with a configured probability
//! - **Affordability**: BUYs need cash, SELLs need inventory
//! - **Failure kinds**: rejections versus broken preconditions

pub mod simulator;
pub mod translate;

pub use simulator::ExecutionSimulator;
pub use translate::signal_to_order;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why an order did not fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    SimulatedFailure,
    InsufficientCapital,
    InsufficientInventory,
    InvariantViolation,
}

impl FailureKind {
    pub const ALL: [FailureKind; 4] = [
        FailureKind::SimulatedFailure,
        FailureKind::InsufficientCapital,
        FailureKind::InsufficientInventory,
        FailureKind::InvariantViolation,
    ];

    /// Rejections are expected business outcomes; anything else is a defect.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, FailureKind::InvariantViolation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::SimulatedFailure => "SIMULATED_FAILURE",
            FailureKind::InsufficientCapital => "INSUFFICIENT_CAPITAL",
            FailureKind::InsufficientInventory => "INSUFFICIENT_INVENTORY",
            FailureKind::InvariantViolation => "INVARIANT_VIOLATION",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExecutionError {
    #[error("simulated execution failure for {symbol}")]
    SimulatedFailure { symbol: String },

    #[error("insufficient capital: need {required:.2}, have {available:.2}")]
    InsufficientCapital { required: f64, available: f64 },

    #[error("insufficient inventory: selling {requested}, holding {held}")]
    InsufficientInventory { requested: u64, held: i64 },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl ExecutionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExecutionError::SimulatedFailure { .. } => FailureKind::SimulatedFailure,
            ExecutionError::InsufficientCapital { .. } => FailureKind::InsufficientCapital,
            ExecutionError::InsufficientInventory { .. } => FailureKind::InsufficientInventory,
            ExecutionError::InvariantViolation(_) => FailureKind::InvariantViolation,
        }
    }

    pub fn is_rejection(&self) -> bool {
        self.kind().is_rejection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invariant_violations_are_not_rejections() {
        let rejections: Vec<_> = FailureKind::ALL.iter().filter(|k| k.is_rejection()).collect();
        assert_eq!(rejections.len(), 3);
        assert!(!ExecutionError::InvariantViolation("x".into()).is_rejection());
    }

    #[test]
    fn failure_kind_serializes_like_display() {
        for kind in FailureKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
