//! Config file → CSV → engine → JSON artifacts, end to end.

use std::fs;
use std::path::Path;

use serde_json::Value;
use ticklab_core::execution::FailureKind;
use ticklab_runner::{run_from_config, BacktestConfig, RunError};

const TICKS: &str = "\
timestamp,symbol,price,daily_volume
2024-01-02T00:00:00,AAPL,50,\"1,000,000\"
2024-01-02T00:00:00,MSFT,300,2000000
2024-01-03T00:00:00,AAPL,51,n/a
2024-01-03T00:00:00,MSFT,305,2000000
2024-01-04T00:00:00,AAPL,52,1000000
";

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn toml_config_runs_and_writes_every_log() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ticks.csv", TICKS);
    let config_path = write(
        dir.path(),
        "backtest.toml",
        r#"
[engine]
initial_capital = 20000
seed = 7

[data]
path = "ticks.csv"

[output]
dir = "out"
signals = true
orders = true

[[strategies]]
type = "benchmark"
symbol = "AAPL"

[[strategies]]
type = "benchmark"
symbol = "MSFT"
"#,
    );

    let mut config = BacktestConfig::from_file(&config_path).unwrap();
    config.output.dir = dir.path().join("out");
    let report = run_from_config(&config).unwrap();

    assert_eq!(report.summary.ticks_processed, 5);
    assert_eq!(report.summary.orders_filled, 2);
    assert_eq!(report.files.len(), 4);

    let out = dir.path().join("out");
    let positions = read_json(&out.join("positions.json"));
    // 10,000 each: AAPL buys 200 @ 50, MSFT buys 33 @ 300.
    let aapl = &positions["benchmark"]["AAPL"];
    assert_eq!(aapl.as_array().unwrap().len(), 1);
    assert_eq!(aapl[0]["qty"], 200);
    assert_eq!(aapl[0]["avg_price"], 50);
    assert_eq!(aapl[0]["remaining_cash"], 0);
    assert_eq!(aapl[0]["timestamp"], "2024-01-02T00:00:00");
    assert_eq!(positions["benchmark"]["MSFT"][0]["qty"], 33);
    assert_eq!(positions["benchmark"]["MSFT"][0]["remaining_cash"], 100);

    let orders = read_json(&out.join("orders.json"));
    assert_eq!(orders["benchmark"]["AAPL"][0]["status"], "FILLED");
    assert_eq!(orders["benchmark"]["AAPL"][0]["failure"], Value::Null);

    let manifest = read_json(&out.join("manifest.json"));
    assert_eq!(manifest["seed"], 7);
    assert_eq!(manifest["tick_count"], 5);
    assert_eq!(manifest["config_hash"], config.config_hash().0.as_str());
}

#[test]
fn certain_failure_is_recorded_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let data = write(dir.path(), "ticks.csv", TICKS);
    let mut config = BacktestConfig::new(data);
    config.engine.failure_rate = 1.0;
    config.engine.seed = Some(1);
    config.output.dir = dir.path().join("out");
    config.output.orders = true;
    config.strategies = vec![ticklab_core::strategy::StrategySpec::new("benchmark", "AAPL")];

    let report = run_from_config(&config).unwrap();
    assert_eq!(report.summary.orders_filled, 0);
    assert_eq!(report.summary.failed_of(FailureKind::SimulatedFailure), 1);

    let orders = read_json(&dir.path().join("out").join("orders.json"));
    assert_eq!(orders["benchmark"]["AAPL"][0]["status"], "FAILED");
    assert_eq!(orders["benchmark"]["AAPL"][0]["failure"], "SIMULATED_FAILURE");
}

#[test]
fn same_config_same_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let data = write(dir.path(), "ticks.csv", TICKS);
    let run = |sub: &str| {
        let mut config = BacktestConfig::new(data.clone());
        config.engine.failure_rate = 0.5;
        config.engine.seed = Some(99);
        config.output.dir = dir.path().join(sub);
        config.output.signals = true;
        config.output.orders = true;
        config.strategies = vec![
            ticklab_core::strategy::StrategySpec::new("benchmark", "AAPL"),
            ticklab_core::strategy::StrategySpec::new("rsi", "MSFT").with_param("period", 1.0),
        ];
        run_from_config(&config).unwrap();
        ["positions.json", "signals.json", "orders.json"]
            .map(|f| fs::read_to_string(dir.path().join(sub).join(f)).unwrap())
    };
    assert_eq!(run("a"), run("b"));
}

#[test]
fn malformed_csv_aborts_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let data = write(dir.path(), "ticks.csv", "timestamp,symbol,price\nnot-a-date,AAPL,1\n");
    let mut config = BacktestConfig::new(data);
    config.strategies = vec![ticklab_core::strategy::StrategySpec::new("benchmark", "AAPL")];
    assert!(matches!(run_from_config(&config), Err(RunError::Data(_))));
}
