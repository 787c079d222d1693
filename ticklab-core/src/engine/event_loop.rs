//! Execution engine: the run-level state machine and the per-tick loop.
//!
//! Per tick, for every strategy bound to the tick's symbol:
//! 1. Evaluate the strategy (errors and panics are isolated to that strategy)
//! 2. Record each signal, translate it to an order, execute it
//! 3. Record the order whatever its outcome
//!
//! After all strategies for the tick, snapshot each bound strategy's account
//! into the ledger when it changed. A strategy that faulted on the tick is
//! not snapshotted for it.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};

use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, error, info, warn, Dispatch};

use crate::domain::{sort_ticks, Account, Signal, StrategyKey, Tick};
use crate::execution::{signal_to_order, ExecutionError, ExecutionSimulator};
use crate::ledger::{
    LedgerError, LedgerSink, OrderRecord, PositionSnapshot, SignalRecord, SinkError,
    StrategyLedger,
};
use crate::rng::RngHierarchy;
use crate::strategy::{Strategy, StrategyError};

use super::config::{ConfigError, EngineConfig};
use super::state::{EnginePhase, RunSummary, StrategyOutcome};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot {action} while engine is {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: EnginePhase,
    },

    #[error("no strategies configured")]
    NoStrategies,

    #[error("strategy {0} is configured more than once")]
    DuplicateStrategy(StrategyKey),

    #[error("failed to persist ledger: {0}")]
    Persistence(#[source] SinkError),
}

struct StrategySlot {
    key: StrategyKey,
    strategy: Box<dyn Strategy>,
    rng: StdRng,
    allocated: f64,
}

pub struct ExecutionEngine {
    config: EngineConfig,
    phase: EnginePhase,
    dispatch: Option<Dispatch>,
    simulator: ExecutionSimulator,
    rng: RngHierarchy,
    ticks: Vec<Tick>,
    slots: Vec<StrategySlot>,
    by_symbol: HashMap<String, Vec<usize>>,
    ledger: StrategyLedger,
    summary: RunSummary,
}

impl ExecutionEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let rng = config
            .seed
            .map_or_else(RngHierarchy::from_entropy, RngHierarchy::new);
        let summary = RunSummary {
            seed: rng.master_seed(),
            ..RunSummary::default()
        };
        Ok(Self {
            simulator: ExecutionSimulator::new(config.failure_rate, config.short_positions),
            config,
            phase: EnginePhase::NotStarted,
            dispatch: None,
            rng,
            ticks: Vec::new(),
            slots: Vec::new(),
            by_symbol: HashMap::new(),
            ledger: StrategyLedger::new(),
            summary,
        })
    }

    /// Route this engine's log events to `dispatch` instead of the process default.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Effective master seed, including one drawn from entropy.
    pub fn seed(&self) -> u64 {
        self.rng.master_seed()
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn ledger(&self) -> &StrategyLedger {
        &self.ledger
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn strategies(&self) -> impl Iterator<Item = (&StrategyKey, &dyn Strategy)> {
        self.slots.iter().map(|s| (&s.key, &*s.strategy))
    }

    pub fn account(&self, key: &StrategyKey) -> Option<&Account> {
        self.slots
            .iter()
            .find(|s| &s.key == key)
            .map(|s| s.strategy.account())
    }

    fn expect_phase(&self, expected: EnginePhase, action: &'static str) -> Result<(), EngineError> {
        if self.phase != expected {
            return Err(EngineError::InvalidPhase {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn advance(&mut self) {
        self.phase = self.phase.next().unwrap_or(EnginePhase::Done);
        debug!(phase = %self.phase, "Engine phase");
    }

    // ── LOADING ──────────────────────────────────────────────────

    /// Take ownership of the tick stream and order it by timestamp.
    pub fn load_ticks<I>(&mut self, ticks: I) -> Result<usize, EngineError>
    where
        I: IntoIterator<Item = Tick>,
    {
        self.expect_phase(EnginePhase::NotStarted, "load ticks")?;
        self.advance();
        let dispatch = self.dispatch.clone();
        scoped(dispatch.as_ref(), || {
            self.ticks = ticks.into_iter().collect();
            sort_ticks(&mut self.ticks);
            info!(ticks = self.ticks.len(), "Loaded {} ticks", self.ticks.len());
        });
        Ok(self.ticks.len())
    }

    // ── ALLOCATING ───────────────────────────────────────────────

    /// Give every strategy an equal share of the initial capital.
    ///
    /// An empty or duplicated strategy set is fatal and ends the run.
    pub fn allocate(&mut self, strategies: Vec<Box<dyn Strategy>>) -> Result<(), EngineError> {
        self.expect_phase(EnginePhase::Loading, "allocate capital")?;
        self.advance();
        let dispatch = self.dispatch.clone();
        scoped(dispatch.as_ref(), || self.allocate_inner(strategies))
    }

    fn allocate_inner(&mut self, strategies: Vec<Box<dyn Strategy>>) -> Result<(), EngineError> {
        if strategies.is_empty() {
            error!("No strategies configured; refusing to start");
            self.phase = EnginePhase::Done;
            return Err(EngineError::NoStrategies);
        }

        let mut seen = HashSet::new();
        for strategy in &strategies {
            let key = StrategyKey::new(strategy.name(), strategy.symbol());
            if !seen.insert(key.clone()) {
                error!(strategy = %key, "Duplicate strategy; refusing to start");
                self.phase = EnginePhase::Done;
                return Err(EngineError::DuplicateStrategy(key));
            }
        }

        if self.simulator.short_positions() {
            warn!("short_positions is enabled but has no effect: SELLs stay limited to held shares");
        }

        let share = self.config.initial_capital / strategies.len() as f64;
        for (i, mut strategy) in strategies.into_iter().enumerate() {
            let key = StrategyKey::new(strategy.name(), strategy.symbol());
            *strategy.account_mut() = Account::new(share);
            self.ledger.register(key.clone());
            self.by_symbol
                .entry(key.symbol.clone())
                .or_default()
                .push(i);
            info!(strategy = %key, capital = share, "Allocated ${:.2} to {}", share, key);
            self.slots.push(StrategySlot {
                rng: self.rng.rng_for(&key),
                key,
                strategy,
                allocated: share,
            });
        }
        Ok(())
    }

    // ── RUNNING ──────────────────────────────────────────────────

    /// Replay every tick. Per-order and per-strategy failures are absorbed.
    pub fn run(&mut self) -> Result<&RunSummary, EngineError> {
        self.expect_phase(EnginePhase::Allocating, "run")?;
        self.advance();
        let dispatch = self.dispatch.clone();
        scoped(dispatch.as_ref(), || self.run_inner());
        Ok(&self.summary)
    }

    fn run_inner(&mut self) {
        info!(
            ticks = self.ticks.len(),
            strategies = self.slots.len(),
            seed = self.rng.master_seed(),
            failure_rate = self.simulator.failure_rate(),
            "Starting run"
        );
        let ticks = std::mem::take(&mut self.ticks);
        for tick in &ticks {
            self.process_tick(tick);
        }
        self.ticks = ticks;

        self.summary.snapshots = self.ledger.total_snapshots();
        self.summary.outcomes = self
            .slots
            .iter()
            .map(|slot| {
                let (orders_filled, orders_failed) = self.ledger.order_counts(&slot.key);
                let account = slot.strategy.account();
                StrategyOutcome {
                    key: slot.key.clone(),
                    allocated_capital: slot.allocated,
                    remaining_capital: account.remaining_capital,
                    position: account.position,
                    orders_filled,
                    orders_failed,
                }
            })
            .collect();

        info!(
            ticks = self.summary.ticks_processed,
            signals = self.summary.signals,
            filled = self.summary.orders_filled,
            failed = self.summary.total_failed(),
            faults = self.summary.strategy_faults,
            "Run complete"
        );
    }

    fn process_tick(&mut self, tick: &Tick) {
        self.summary.ticks_processed += 1;
        let Some(slot_ids) = self.by_symbol.get(&tick.symbol) else {
            debug!(symbol = %tick.symbol, "No strategy bound to symbol");
            return;
        };
        let max_order_volume = tick.max_order_volume(self.config.volume_participation);
        let mut faulted = Vec::new();

        for &i in slot_ids {
            let slot = &mut self.slots[i];
            let signals = match evaluate(&mut *slot.strategy, tick, max_order_volume) {
                Ok(signals) => signals,
                Err(e) => {
                    self.summary.strategy_faults += 1;
                    faulted.push(i);
                    warn!(strategy = %slot.key, timestamp = %tick.timestamp, error = %e,
                        "Strategy fault; skipping tick");
                    continue;
                }
            };

            for signal in signals {
                self.summary.signals += 1;
                note(self.ledger.record_signal(&slot.key, SignalRecord::new(&signal, tick.price)));

                let mut order = signal_to_order(&signal, tick);
                let result = if signal.symbol == slot.key.symbol {
                    self.simulator
                        .execute(&mut order, slot.strategy.account_mut(), &mut slot.rng)
                } else {
                    Err(ExecutionError::InvariantViolation(format!(
                        "signal for {} from strategy bound to {}",
                        signal.symbol, slot.key.symbol
                    )))
                };

                let failure = match result {
                    Ok(()) => {
                        self.summary.orders_filled += 1;
                        let capital = slot.strategy.remaining_capital();
                        info!(
                            strategy = %slot.key,
                            symbol = %order.symbol,
                            quantity = order.quantity,
                            price = order.price,
                            capital,
                            "Executed {}: {} {}@{:.2} | Strategy: {} | Capital: ${:.2}",
                            order.side, order.symbol, order.quantity, order.price, slot.key, capital
                        );
                        None
                    }
                    Err(e) => {
                        if let Err(transition) = order.mark_failed() {
                            debug!(error = %transition, "Order already terminal");
                        }
                        let kind = e.kind();
                        *self.summary.orders_failed.entry(kind).or_insert(0) += 1;
                        log_failure(&slot.key, &signal, &e);
                        Some(kind)
                    }
                };
                note(self.ledger.record_order(
                    &slot.key,
                    OrderRecord::new(tick.timestamp, &order, failure),
                ));
            }
        }

        for &i in slot_ids {
            if faulted.contains(&i) {
                continue;
            }
            let slot = &self.slots[i];
            let snapshot = PositionSnapshot::from_account(tick.timestamp, slot.strategy.account());
            match self.ledger.record_snapshot(&slot.key, snapshot) {
                Ok(true) => debug!(strategy = %slot.key, "Position snapshot recorded"),
                Ok(false) => {}
                Err(e) => error!(error = %e, "Ledger rejected snapshot"),
            }
        }
    }

    // ── SAVING ───────────────────────────────────────────────────

    /// Hand the ledger to `sink`. The engine is `Done` afterwards either way.
    pub fn save(&mut self, sink: &mut dyn LedgerSink) -> Result<(), EngineError> {
        self.expect_phase(EnginePhase::Running, "save")?;
        self.advance();
        let dispatch = self.dispatch.clone();
        let result = scoped(dispatch.as_ref(), || {
            info!(
                keys = self.ledger.keys().len(),
                snapshots = self.ledger.total_snapshots(),
                signals = self.ledger.total_signals(),
                orders = self.ledger.total_orders(),
                "Saving ledger"
            );
            sink.persist(&self.ledger).map_err(|e| {
                error!(error = %e, "Failed to persist ledger");
                EngineError::Persistence(e)
            })
        });
        self.advance();
        result
    }
}

fn scoped<T>(dispatch: Option<&Dispatch>, f: impl FnOnce() -> T) -> T {
    match dispatch {
        Some(d) => tracing::dispatcher::with_default(d, f),
        None => f(),
    }
}

fn evaluate(
    strategy: &mut dyn Strategy,
    tick: &Tick,
    max_order_volume: Option<f64>,
) -> Result<Vec<Signal>, StrategyError> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        strategy.generate_signals(tick, max_order_volume)
    })) {
        Ok(result) => result,
        Err(payload) => Err(StrategyError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn log_failure(key: &StrategyKey, signal: &Signal, e: &ExecutionError) {
    if e.is_rejection() {
        warn!(
            strategy = %key,
            kind = %e.kind(),
            "Order failed: {} {} {} | Strategy: {} | {}",
            signal.side, signal.quantity, signal.symbol, key, e
        );
    } else {
        error!(
            strategy = %key,
            kind = %e.kind(),
            "Order rejected by invariant check: {} {} {} | Strategy: {} | {}",
            signal.side, signal.quantity, signal.symbol, key, e
        );
    }
}

fn note(result: Result<(), LedgerError>) {
    if let Err(e) = result {
        error!(error = %e, "Ledger rejected record");
    }
}
