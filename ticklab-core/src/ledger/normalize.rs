//! JSON-safe rendering of the ledger.
//!
//! Every persisted value is a JSON primitive: numbers that are exactly
//! integral become integers, other finite numbers stay floats, non-finite
//! numbers become `null`, and timestamps use the canonical ISO-8601 text.

use serde::Serialize;
use serde_json::{json, Map, Number, Value};

use crate::domain::{canonical_timestamp, StrategyKey};

use super::{OrderRecord, PositionSnapshot, SignalRecord, StrategyLedger};

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

pub fn normalize_number(v: f64) -> Value {
    if !v.is_finite() {
        return Value::Null;
    }
    if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER {
        return Value::from(v as i64);
    }
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

fn position_json(s: &PositionSnapshot) -> Value {
    json!({
        "timestamp": canonical_timestamp(&s.timestamp),
        "qty": s.qty,
        "avg_price": normalize_number(s.avg_price),
        "remaining_cash": normalize_number(s.remaining_cash),
    })
}

fn signal_json(s: &SignalRecord) -> Value {
    json!({
        "timestamp": canonical_timestamp(&s.timestamp),
        "side": s.side.to_string(),
        "quantity": s.quantity,
        "price": normalize_number(s.price),
        "strategy": s.strategy,
        "reason": s.reason,
    })
}

fn order_json(o: &OrderRecord) -> Value {
    json!({
        "timestamp": canonical_timestamp(&o.timestamp),
        "side": o.side.to_string(),
        "symbol": o.symbol,
        "quantity": o.quantity,
        "price": normalize_number(o.price),
        "status": o.status,
        "failure": o.failure.map(|k| k.as_str()),
    })
}

/// `{ strategy: { symbol: [record, ...] } }` for every registered key.
fn nest(ledger: &StrategyLedger, rows: impl Fn(&StrategyKey) -> Vec<Value>) -> Value {
    let mut by_strategy = Map::new();
    for key in ledger.keys() {
        let symbols = by_strategy
            .entry(key.strategy.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(symbols) = symbols {
            symbols.insert(key.symbol.clone(), Value::Array(rows(key)));
        }
    }
    Value::Object(by_strategy)
}

/// The three ledger logs rendered as JSON-safe documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerJson {
    pub positions: Value,
    pub signals: Value,
    pub orders: Value,
}

impl LedgerJson {
    pub fn from_ledger(ledger: &StrategyLedger) -> Self {
        Self {
            positions: nest(ledger, |k| ledger.positions(k).map(position_json).collect()),
            signals: nest(ledger, |k| ledger.signals(k).map(signal_json).collect()),
            orders: nest(ledger, |k| ledger.orders(k).map(order_json).collect()),
        }
    }
}
