//! Strategy ledger: per-(strategy, symbol) history of positions, signals and orders.
//!
//! Storage is arena-style: three global append-only logs plus a secondary
//! index from each [`StrategyKey`] to the positions of its records. The last
//! position snapshot of a key is found in O(1), which keeps the
//! append-on-change check cheap.
//!
//! Signals and orders are appended unconditionally. Position snapshots are
//! appended only when capital or holding differ from the key's last snapshot.

pub mod normalize;
pub mod records;

pub use normalize::{normalize_number, LedgerJson};
pub use records::{OrderRecord, PositionSnapshot, SignalRecord};

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::StrategyKey;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("no ledger bucket for {0}")]
    UnknownKey(StrategyKey),
}

/// Error returned by a persistence sink.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Persistence boundary: receives the finished ledger during SAVING.
pub trait LedgerSink {
    fn persist(&mut self, ledger: &StrategyLedger) -> Result<(), SinkError>;
}

/// Keeps the normalized ledger in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub persisted: Option<LedgerJson>,
}

impl LedgerSink for MemorySink {
    fn persist(&mut self, ledger: &StrategyLedger) -> Result<(), SinkError> {
        self.persisted = Some(LedgerJson::from_ledger(ledger));
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct KeyIndex {
    positions: Vec<usize>,
    signals: Vec<usize>,
    orders: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct StrategyLedger {
    keys: Vec<StrategyKey>,
    index: HashMap<StrategyKey, KeyIndex>,
    positions: Vec<PositionSnapshot>,
    signals: Vec<SignalRecord>,
    orders: Vec<OrderRecord>,
}

impl StrategyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bucket. Returns `false` if the key already exists.
    pub fn register(&mut self, key: StrategyKey) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), KeyIndex::default());
        self.keys.push(key);
        true
    }

    /// Keys in registration order.
    pub fn keys(&self) -> &[StrategyKey] {
        &self.keys
    }

    fn bucket_mut(&mut self, key: &StrategyKey) -> Result<&mut KeyIndex, LedgerError> {
        self.index
            .get_mut(key)
            .ok_or_else(|| LedgerError::UnknownKey(key.clone()))
    }

    /// Append `snapshot` if it differs from the key's last one.
    ///
    /// Returns whether a record was appended.
    pub fn record_snapshot(
        &mut self,
        key: &StrategyKey,
        snapshot: PositionSnapshot,
    ) -> Result<bool, LedgerError> {
        if self
            .last_snapshot(key)
            .is_some_and(|prev| prev.same_state(&snapshot))
        {
            return Ok(false);
        }
        let next = self.positions.len();
        self.bucket_mut(key)?.positions.push(next);
        self.positions.push(snapshot);
        Ok(true)
    }

    pub fn record_signal(
        &mut self,
        key: &StrategyKey,
        record: SignalRecord,
    ) -> Result<(), LedgerError> {
        let next = self.signals.len();
        self.bucket_mut(key)?.signals.push(next);
        self.signals.push(record);
        Ok(())
    }

    pub fn record_order(
        &mut self,
        key: &StrategyKey,
        record: OrderRecord,
    ) -> Result<(), LedgerError> {
        let next = self.orders.len();
        self.bucket_mut(key)?.orders.push(next);
        self.orders.push(record);
        Ok(())
    }

    pub fn last_snapshot(&self, key: &StrategyKey) -> Option<&PositionSnapshot> {
        let i = *self.index.get(key)?.positions.last()?;
        self.positions.get(i)
    }

    /// Position snapshots of `key`, oldest first. Empty for unknown keys.
    pub fn positions<'a>(
        &'a self,
        key: &StrategyKey,
    ) -> impl Iterator<Item = &'a PositionSnapshot> + 'a {
        let idx = self.index.get(key).map(|b| b.positions.as_slice()).unwrap_or(&[]);
        idx.iter().map(move |&i| &self.positions[i])
    }

    pub fn signals<'a>(&'a self, key: &StrategyKey) -> impl Iterator<Item = &'a SignalRecord> + 'a {
        let idx = self.index.get(key).map(|b| b.signals.as_slice()).unwrap_or(&[]);
        idx.iter().map(move |&i| &self.signals[i])
    }

    pub fn orders<'a>(&'a self, key: &StrategyKey) -> impl Iterator<Item = &'a OrderRecord> + 'a {
        let idx = self.index.get(key).map(|b| b.orders.as_slice()).unwrap_or(&[]);
        idx.iter().map(move |&i| &self.orders[i])
    }

    /// (filled, failed) order counts for `key`.
    pub fn order_counts(&self, key: &StrategyKey) -> (usize, usize) {
        self.orders(key).fold((0, 0), |(filled, failed), o| {
            if o.is_filled() {
                (filled + 1, failed)
            } else {
                (filled, failed + 1)
            }
        })
    }

    pub fn total_snapshots(&self) -> usize {
        self.positions.len()
    }

    pub fn total_signals(&self) -> usize {
        self.signals.len()
    }

    pub fn total_orders(&self) -> usize {
        self.orders.len()
    }
}
