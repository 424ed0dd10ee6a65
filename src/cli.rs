//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store_adapter::JsonStoreAdapter;
use crate::domain::backtest::BacktestEngine;
use crate::domain::error::FxgridError;
use crate::domain::grid::ParameterGrid;
use crate::domain::mode::resolve_modes;
use crate::domain::optimize::{
    BollingerPipeline, OptimizationResult, Optimizer, OptimizerConfig, ValidationGates,
};
use crate::domain::params::PipelineParams;
use crate::domain::regime::RegimeClassifier;
use crate::domain::signal::generate_signals;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::results_port::ResultsStorePort;

#[derive(Parser, Debug)]
#[command(name = "fxgrid", about = "Grid-search FX strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest each configured pair with its stored or default parameters
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Restrict the run to a single pair
        #[arg(long)]
        pair: Option<String>,
    },
    /// Grid-search every configured pair and persist the results
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the results path from the config file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the live/paper trade mode each pair resolves to
    Modes {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Check a configuration file without touching any data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest { config, pair } => run_backtest(&config, pair.as_deref()),
        Command::Optimize { config, output } => run_optimize(&config, output.as_ref()),
        Command::Modes { config } => run_modes(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FxgridError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_backtest(config_path: &PathBuf, pair_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let pairs = match resolve_pairs(&adapter, pair_override) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let engine = match build_engine(&adapter) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data_port = CsvAdapter::new(data_path(&adapter));
    let stored = JsonStoreAdapter::new(results_path(&adapter))
        .load()
        .unwrap_or_default();

    let mut first_failure: Option<ExitCode> = None;
    let mut completed = 0usize;

    for pair in &pairs {
        let params = match stored.get(pair) {
            Some(r) if r.passed_validation => match PipelineParams::try_from(&r.best_params) {
                Ok(p) => {
                    eprintln!("{pair}: using optimized parameters");
                    p
                }
                Err(_) => PipelineParams::default_for_pair(pair),
            },
            _ => PipelineParams::default_for_pair(pair),
        };

        match backtest_pair(&data_port, &engine, pair, &params) {
            Ok(()) => completed += 1,
            Err(e) => {
                eprintln!("warning: skipping {pair} ({e})");
                first_failure.get_or_insert((&e).into());
            }
        }
    }

    if completed == 0 {
        eprintln!("error: no pair completed a backtest");
        return first_failure.unwrap_or(ExitCode::from(5));
    }
    eprintln!("\nCompleted {completed}/{} pairs", pairs.len());
    first_failure.unwrap_or(ExitCode::SUCCESS)
}

fn backtest_pair(
    data_port: &dyn DataPort,
    engine: &BacktestEngine,
    pair: &str,
    params: &PipelineParams,
) -> Result<(), FxgridError> {
    let h1 = data_port.fetch_bars(pair, "H1")?;
    let m15 = data_port.fetch_bars(pair, "M15")?;

    let signals = generate_signals(pair, params, &h1, &m15)?;
    let result = engine.run(pair, &signals)?;

    eprintln!("\n=== {pair} ===");
    eprintln!("Bars:            {} M15 / {} H1", m15.len(), h1.len());
    eprintln!("Trades:          {}", result.total_trades());
    eprintln!("Final Balance:   {:.2}", result.final_balance);
    eprintln!("Total Return:    {:.2}%", result.total_return_pct());
    eprintln!("Win Rate:        {:.1}%", result.win_rate * 100.0);
    eprintln!("Profit Factor:   {:.2}", result.profit_factor);
    eprintln!("Sharpe Ratio:    {:.2}", result.sharpe_ratio);
    eprintln!("Max Drawdown:    -{:.1}%", result.max_drawdown * 100.0);
    eprintln!("Avg Pips/Trade:  {:.1}", result.avg_pips_per_trade);
    if result.skipped_signals > 0 {
        eprintln!("Skipped Signals: {}", result.skipped_signals);
    }
    Ok(())
}

fn run_optimize(config_path: &PathBuf, output_override: Option<&PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let pairs = match resolve_pairs(&adapter, None) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let config = build_optimizer_config(&adapter);
    let optimizer = match Optimizer::new(config, BollingerPipeline) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data_port = CsvAdapter::new(data_path(&adapter));

    let mut results: BTreeMap<String, OptimizationResult> = BTreeMap::new();
    let mut first_failure: Option<ExitCode> = None;

    for pair in &pairs {
        eprintln!("\nOptimizing {pair}...");
        let outcome = data_port.fetch_bars(pair, "H1").and_then(|h1| {
            let m15 = data_port.fetch_bars(pair, "M15")?;
            optimizer.run(pair, &h1, &m15, &ParameterGrid::default_for_pair(pair))
        });

        match outcome {
            Ok(result) => {
                if result.passed_validation {
                    eprintln!(
                        "{pair}: PASSED (IS sharpe {:.2}, OOS sharpe {:.2}, OOS win rate {:.1}%)",
                        result.in_sample_sharpe,
                        result.out_of_sample_sharpe,
                        result.out_of_sample_win_rate * 100.0
                    );
                } else {
                    eprintln!(
                        "{pair}: rejected ({})",
                        result.rejection_reason.as_deref().unwrap_or("unknown")
                    );
                }
                results.insert(pair.clone(), result);
            }
            Err(e) => {
                eprintln!("warning: skipping {pair} ({e})");
                first_failure.get_or_insert((&e).into());
            }
        }
    }

    if results.is_empty() {
        eprintln!("error: no pair produced an optimization result");
        return first_failure.unwrap_or(ExitCode::from(5));
    }

    let store_path = output_override
        .cloned()
        .unwrap_or_else(|| results_path(&adapter));
    let store = JsonStoreAdapter::new(store_path.clone());
    if let Err(e) = store.save(&results) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let passed = results.values().filter(|r| r.passed_validation).count();
    eprintln!(
        "\nSaved {} results to {} ({} passed validation)",
        results.len(),
        store_path.display(),
        passed
    );
    first_failure.unwrap_or(ExitCode::SUCCESS)
}

fn run_modes(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let pairs = match resolve_pairs(&adapter, None) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let stored = JsonStoreAdapter::new(results_path(&adapter))
        .load()
        .unwrap_or_default();
    if stored.is_empty() {
        eprintln!("note: no stored optimization results; all pairs resolve to paper");
    }

    for (pair, mode) in resolve_modes(&pairs, &stored) {
        println!("{pair}: {mode:?}");
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checks: Result<(), FxgridError> = (|| {
        let pairs = resolve_pairs(&adapter, None)?;
        build_engine(&adapter)?;

        let config = build_optimizer_config(&adapter);
        Optimizer::new(config, BollingerPipeline)?;

        for pair in &pairs {
            let params = PipelineParams::default_for_pair(pair);
            RegimeClassifier::new(
                params.bb_width_threshold,
                params.min_bb_width,
                params.atr_ratio_threshold,
            )?;
            ParameterGrid::default_for_pair(pair).enumerate(pair)?;
        }
        Ok(())
    })();

    match checks {
        Ok(()) => {
            eprintln!("configuration OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn data_path(adapter: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        adapter
            .get_string("data", "path")
            .unwrap_or_else(|| "./data".to_string()),
    )
}

fn results_path(adapter: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        adapter
            .get_string("optimizer", "results_path")
            .unwrap_or_else(|| "optimization_results.json".to_string()),
    )
}

fn resolve_pairs(
    adapter: &dyn ConfigPort,
    pair_override: Option<&str>,
) -> Result<Vec<String>, FxgridError> {
    if let Some(pair) = pair_override {
        return Ok(vec![pair.to_string()]);
    }

    let raw = adapter
        .get_string("pairs", "list")
        .ok_or_else(|| FxgridError::ConfigMissing {
            section: "pairs".into(),
            key: "list".into(),
        })?;

    let pairs: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if pairs.is_empty() {
        return Err(FxgridError::ConfigInvalid {
            section: "pairs".into(),
            key: "list".into(),
            reason: "no pairs configured".into(),
        });
    }
    Ok(pairs)
}

pub fn build_engine(adapter: &dyn ConfigPort) -> Result<BacktestEngine, FxgridError> {
    BacktestEngine::new(
        adapter.get_double("backtest", "initial_balance", 10_000.0),
        adapter.get_double("backtest", "risk_pct", 0.01),
    )
}

pub fn build_optimizer_config(adapter: &dyn ConfigPort) -> OptimizerConfig {
    let defaults = ValidationGates::default();
    let fallback_pairs = adapter
        .get_string("validation", "fallback_pairs")
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or(defaults.fallback_pairs);

    OptimizerConfig {
        data_split: adapter.get_double("optimizer", "data_split", 0.7),
        initial_balance: adapter.get_double("backtest", "initial_balance", 10_000.0),
        risk_pct: adapter.get_double("backtest", "risk_pct", 0.01),
        gates: ValidationGates {
            min_oos_sharpe: adapter.get_double(
                "validation",
                "min_oos_sharpe",
                defaults.min_oos_sharpe,
            ),
            fallback_oos_sharpe: adapter.get_double(
                "validation",
                "fallback_oos_sharpe",
                defaults.fallback_oos_sharpe,
            ),
            fallback_pairs,
            min_oos_win_rate: adapter.get_double(
                "validation",
                "min_oos_win_rate",
                defaults.min_oos_win_rate,
            ),
            min_is_trades: adapter.get_int(
                "validation",
                "min_is_trades",
                defaults.min_is_trades as i64,
            ) as usize,
        },
    }
}
