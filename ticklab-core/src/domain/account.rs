//! Account: the capital and position owned by one strategy instance.

use super::position::Position;
use serde::{Deserialize, Serialize};

/// Remaining uninvested cash plus the current holding.
///
/// Written by the engine when allocating capital and by the execution
/// simulator when filling orders. Strategies only read it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Account {
    pub remaining_capital: f64,
    pub position: Position,
}

impl Account {
    pub fn new(remaining_capital: f64) -> Self {
        Self {
            remaining_capital,
            position: Position::default(),
        }
    }
}

