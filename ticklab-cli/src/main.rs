use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ticklab_core::strategy::{StrategySpec, STRATEGY_TYPES};
use ticklab_runner::{run_from_config, BacktestConfig, BacktestReport};

#[derive(Parser)]
#[command(name = "ticklab", about = "Tick-level backtesting accounting engine")]
struct Cli {
    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest
    Run {
        /// Path to a TOML backtest config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tick CSV (required without --config)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Strategy type (required without --config)
        #[arg(long)]
        strategy: Option<String>,

        /// Symbols to run the strategy on (repeatable)
        #[arg(long = "symbol", num_args = 1..)]
        symbols: Vec<String>,

        /// Strategy parameter as name=value (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,

        #[arg(long)]
        initial_capital: Option<f64>,

        #[arg(long)]
        failure_rate: Option<f64>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Also write signals.json
        #[arg(long)]
        save_signals: bool,

        /// Also write orders.json
        #[arg(long)]
        save_orders: bool,
    },
    /// List the available strategy types
    Strategies,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    match cli.command {
        Commands::Run {
            config,
            data,
            strategy,
            symbols,
            params,
            initial_capital,
            failure_rate,
            seed,
            output_dir,
            save_signals,
            save_orders,
        } => {
            let mut backtest = match config {
                Some(path) => {
                    if data.is_some() || strategy.is_some() {
                        bail!("--config cannot be combined with --data or --strategy");
                    }
                    BacktestConfig::from_file(&path)
                        .with_context(|| format!("loading config {}", path.display()))?
                }
                None => config_from_flags(data, strategy, symbols, params)?,
            };

            if let Some(capital) = initial_capital {
                backtest.engine.initial_capital = capital;
            }
            if let Some(rate) = failure_rate {
                backtest.engine.failure_rate = rate;
            }
            if let Some(seed) = seed {
                backtest.engine.seed = Some(seed);
            }
            if let Some(dir) = output_dir {
                backtest.output.dir = dir;
            }
            backtest.output.signals |= save_signals;
            backtest.output.orders |= save_orders;
            backtest.validate()?;

            info!(
                data = %backtest.data.path.display(),
                strategies = backtest.strategies.len(),
                config_hash = %backtest.config_hash(),
                "Starting backtest"
            );
            let report = run_from_config(&backtest).map_err(|e| {
                error!(error = %e, "Backtest failed");
                e
            })?;
            info!(
                output_dir = %report.output_dir.display(),
                files = report.files.len(),
                "Backtest artifacts written"
            );
            print_summary(&report);
            Ok(())
        }
        Commands::Strategies => {
            for name in STRATEGY_TYPES {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| anyhow!("failed to initialise logging: {e}"))
}

fn config_from_flags(
    data: Option<PathBuf>,
    strategy: Option<String>,
    symbols: Vec<String>,
    params: Vec<(String, f64)>,
) -> Result<BacktestConfig> {
    let Some(data) = data else {
        bail!("one of --config or --data is required");
    };
    let Some(strategy) = strategy else {
        bail!("--strategy is required without --config");
    };
    if symbols.is_empty() {
        bail!("at least one --symbol is required");
    }

    let mut config = BacktestConfig::new(data);
    config.strategies = symbols
        .into_iter()
        .map(|symbol| {
            params
                .iter()
                .fold(StrategySpec::new(strategy.as_str(), symbol), |spec, (k, v)| {
                    spec.with_param(k.as_str(), *v)
                })
        })
        .collect();
    Ok(config)
}

fn parse_param(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("parameter '{name}' is not a number: '{value}'"))?;
    Ok((name.trim().to_string(), value))
}

fn print_summary(report: &BacktestReport) {
    let summary = &report.summary;
    println!(
        "Backtest complete: {} ticks, {} signals, {} filled, {} failed (seed {})",
        summary.ticks_processed,
        summary.signals,
        summary.orders_filled,
        summary.total_failed(),
        summary.seed,
    );
    if summary.strategy_faults > 0 {
        println!("Strategy faults: {}", summary.strategy_faults);
    }
    for (kind, count) in &summary.orders_failed {
        println!("  {kind}: {count}");
    }

    println!();
    println!(
        "{:<32} {:>14} {:>14} {:>10} {:>12} {:>7} {:>7}",
        "Strategy", "Allocated", "Final Cash", "Qty", "Avg Price", "Filled", "Failed"
    );
    for outcome in &summary.outcomes {
        println!(
            "{:<32} {:>14.2} {:>14.2} {:>10} {:>12.2} {:>7} {:>7}",
            outcome.key.to_string(),
            outcome.allocated_capital,
            outcome.remaining_capital,
            outcome.position.quantity,
            outcome.position.avg_price,
            outcome.orders_filled,
            outcome.orders_failed,
        );
    }

    println!();
    println!("Ledger written to: {}", report.output_dir.display());
    for file in &report.files {
        println!("  {}", file.display());
    }
}
