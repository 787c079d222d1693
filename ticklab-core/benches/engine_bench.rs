//! Criterion benchmarks for TickLab hot paths.
//!
//! Benchmarks:
//! 1. Tick event loop (full run with every strategy type)
//! 2. Execution simulator (fill and reject paths)
//! 3. Ledger append-on-change
//! 4. Streaming indicators

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ticklab_core::domain::{Account, Order, Side, StrategyKey, Tick};
use ticklab_core::engine::run_backtest;
use ticklab_core::execution::ExecutionSimulator;
use ticklab_core::indicators::{Ema, Indicator, Rsi, Sma};
use ticklab_core::ledger::{MemorySink, PositionSnapshot, StrategyLedger};
use ticklab_core::strategy::{create_strategy, Strategy, StrategySpec, STRATEGY_TYPES};
use ticklab_core::EngineConfig;

// ── Helpers ──────────────────────────────────────────────────────────

fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(i as i64)
}

fn make_ticks(n: usize, symbols: &[&str]) -> Vec<Tick> {
    (0..n)
        .flat_map(|i| {
            symbols.iter().enumerate().map(move |(k, sym)| {
                let price = 100.0 + (i as f64 * 0.1 + k as f64).sin() * 10.0;
                Tick::new(ts(i), *sym, price).with_volume(1_000_000.0)
            })
        })
        .collect()
}

fn make_strategies(symbols: &[&str]) -> Vec<Box<dyn Strategy>> {
    symbols
        .iter()
        .flat_map(|sym| {
            STRATEGY_TYPES
                .iter()
                .map(move |t| create_strategy(&StrategySpec::new(*t, *sym)).unwrap())
        })
        .collect()
}

// ── 1. Tick Event Loop ───────────────────────────────────────────────

fn bench_tick_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_event_loop");

    for &tick_count in &[252, 1260, 2520] {
        let ticks = make_ticks(tick_count, &["SPY"]);
        group.bench_with_input(
            BenchmarkId::new("all_strategies", tick_count),
            &tick_count,
            |b, _| {
                b.iter(|| {
                    let mut sink = MemorySink::default();
                    run_backtest(
                        EngineConfig::new(100_000.0).with_failure_rate(0.05).with_seed(7),
                        black_box(ticks.clone()),
                        make_strategies(&["SPY"]),
                        &mut sink,
                    )
                });
            },
        );
    }

    let symbols = ["SPY", "QQQ", "IWM", "TLT", "GLD", "EFA", "EEM", "DBC", "VNQ", "HYG"];
    let ticks = make_ticks(1260, &symbols);
    group.bench_function("10_symbols_1260_ticks", |b| {
        b.iter(|| {
            let mut sink = MemorySink::default();
            run_backtest(
                EngineConfig::new(1_000_000.0).with_seed(7),
                black_box(ticks.clone()),
                make_strategies(&symbols),
                &mut sink,
            )
        });
    });

    group.finish();
}

// ── 2. Execution Simulator ───────────────────────────────────────────

fn bench_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("execution");
    let sim = ExecutionSimulator::new(0.1, false);

    group.bench_function("buy_sell_1000", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            let mut account = Account::new(1_000_000.0);
            for i in 0..1000 {
                let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                let mut order = Order::new("SPY", side, 10, 100.0 + i as f64 * 0.01);
                let _ = sim.execute(black_box(&mut order), &mut account, &mut rng);
            }
            account
        });
    });

    group.finish();
}

// ── 3. Ledger ────────────────────────────────────────────────────────

fn bench_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger");
    let key = StrategyKey::new("benchmark", "SPY");

    group.bench_function("snapshot_mostly_unchanged_10000", |b| {
        b.iter(|| {
            let mut ledger = StrategyLedger::new();
            ledger.register(key.clone());
            for i in 0..10_000 {
                let capital = 10_000.0 - (i / 100) as f64;
                let snap = PositionSnapshot::from_account(ts(i), &Account::new(capital));
                let _ = ledger.record_snapshot(&key, black_box(snap));
            }
            ledger.total_snapshots()
        });
    });

    group.finish();
}

// ── 4. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    let prices: Vec<f64> = (0..2520)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect();

    let cases: Vec<(&str, fn() -> Box<dyn Indicator>)> = vec![
        ("sma_50", || -> Box<dyn Indicator> { Box::new(Sma::new(50)) }),
        ("ema_26", || -> Box<dyn Indicator> { Box::new(Ema::new(26)) }),
        ("rsi_14", || -> Box<dyn Indicator> { Box::new(Rsi::new(14)) }),
    ];

    for (name, make) in cases {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut ind = make();
                let mut last = None;
                for &p in &prices {
                    last = ind.update(black_box(p));
                }
                last
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_tick_loop,
    bench_execution,
    bench_ledger,
    bench_indicators,
);
criterion_main!(benches);
