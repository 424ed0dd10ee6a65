//! Grid-search optimization with out-of-sample validation.
//!
//! For one pair the optimizer enumerates a parameter grid, backtests every
//! combination on the in-sample window in parallel, picks the combination
//! with the highest in-sample Sharpe (first wins on ties, so the result is
//! deterministic regardless of thread scheduling), then re-runs the winner
//! on the held-out window and applies the validation gates. A pair that
//! fails a gate still gets a result record, with `passed_validation` false
//! and the reason attached.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::backtest::{BacktestEngine, BacktestResult};
use super::bar::{Bar, SignalBar};
use super::error::FxgridError;
use super::grid::{ParameterCombination, ParameterGrid};
use super::params::PipelineParams;
use super::signal::generate_signals;

/// Turns raw dual-timeframe bars into an annotated signal sequence.
/// Implementations must be thread-safe; the optimizer calls them from a
/// worker pool.
pub trait SignalPipeline: Sync {
    fn generate(
        &self,
        pair: &str,
        params: &PipelineParams,
        h1: &[Bar],
        m15: &[Bar],
    ) -> Result<Vec<SignalBar>, FxgridError>;
}

/// The production pipeline: Bollinger band reversion gated by H1 regime.
pub struct BollingerPipeline;

impl SignalPipeline for BollingerPipeline {
    fn generate(
        &self,
        pair: &str,
        params: &PipelineParams,
        h1: &[Bar],
        m15: &[Bar],
    ) -> Result<Vec<SignalBar>, FxgridError> {
        generate_signals(pair, params, h1, m15)
    }
}

/// Acceptance thresholds applied to the selected combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationGates {
    pub min_oos_sharpe: f64,
    /// Relaxed Sharpe floor for pairs listed in `fallback_pairs`.
    pub fallback_oos_sharpe: f64,
    pub fallback_pairs: Vec<String>,
    pub min_oos_win_rate: f64,
    pub min_is_trades: usize,
}

impl Default for ValidationGates {
    fn default() -> Self {
        ValidationGates {
            min_oos_sharpe: 0.3,
            fallback_oos_sharpe: 0.15,
            fallback_pairs: vec!["EUR_USD".into(), "GBP_USD".into()],
            min_oos_win_rate: 0.4,
            min_is_trades: 20,
        }
    }
}

impl ValidationGates {
    fn sharpe_floor(&self, pair: &str) -> f64 {
        if self.fallback_pairs.iter().any(|p| p == pair) {
            self.fallback_oos_sharpe
        } else {
            self.min_oos_sharpe
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Fraction of the M15 frame assigned to the in-sample window.
    pub data_split: f64,
    pub initial_balance: f64,
    pub risk_pct: f64,
    pub gates: ValidationGates,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            data_split: 0.7,
            initial_balance: 10_000.0,
            risk_pct: 0.01,
            gates: ValidationGates::default(),
        }
    }
}

/// Persisted outcome of one pair's optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub pair: String,
    pub best_params: ParameterCombination,
    pub in_sample_sharpe: f64,
    pub in_sample_trades: usize,
    pub out_of_sample_sharpe: f64,
    pub out_of_sample_win_rate: f64,
    pub out_of_sample_trades: usize,
    pub total_combinations_tested: usize,
    pub passed_validation: bool,
    pub rejection_reason: Option<String>,
}

impl OptimizationResult {
    fn rejected(pair: &str, combinations: usize, reason: String) -> Self {
        OptimizationResult {
            pair: pair.to_string(),
            best_params: ParameterCombination::empty(),
            in_sample_sharpe: 0.0,
            in_sample_trades: 0,
            out_of_sample_sharpe: 0.0,
            out_of_sample_win_rate: 0.0,
            out_of_sample_trades: 0,
            total_combinations_tested: combinations,
            passed_validation: false,
            rejection_reason: Some(reason),
        }
    }
}

pub struct Optimizer<P: SignalPipeline> {
    config: OptimizerConfig,
    pipeline: P,
}

impl<P: SignalPipeline> Optimizer<P> {
    pub fn new(config: OptimizerConfig, pipeline: P) -> Result<Self, FxgridError> {
        if !(0.0..1.0).contains(&config.data_split) || config.data_split == 0.0 {
            return Err(FxgridError::ConfigInvalid {
                section: "optimizer".into(),
                key: "data_split".into(),
                reason: format!("must be in (0, 1), got {}", config.data_split),
            });
        }
        Ok(Optimizer { config, pipeline })
    }

    /// Run the full search for one pair.
    pub fn run(
        &self,
        pair: &str,
        h1: &[Bar],
        m15: &[Bar],
        grid: &ParameterGrid,
    ) -> Result<OptimizationResult, FxgridError> {
        let combos = grid.enumerate(pair)?;
        let split = split_frames(pair, h1, m15, self.config.data_split)?;
        let engine = BacktestEngine::new(self.config.initial_balance, self.config.risk_pct)?;

        // In-sample scan. A combination that fails to backtest (degenerate
        // parameters, no signals surviving validation) is skipped rather
        // than aborting the search.
        let scores: Vec<Option<(f64, usize)>> = combos
            .par_iter()
            .map(|combo| {
                self.evaluate(pair, combo, &engine, split.is_h1, split.is_m15)
                    .map(|r| (r.sharpe_ratio, r.total_trades()))
            })
            .collect();

        let mut best: Option<(usize, f64, usize)> = None;
        for (idx, score) in scores.iter().enumerate() {
            if let Some((sharpe, trades)) = score
                && best.is_none_or(|(_, best_sharpe, _)| *sharpe > best_sharpe)
            {
                best = Some((idx, *sharpe, *trades));
            }
        }

        let Some((best_idx, is_sharpe, is_trades)) = best else {
            return Ok(OptimizationResult::rejected(
                pair,
                combos.len(),
                "no parameter combination produced a usable in-sample backtest".into(),
            ));
        };

        let best_params = combos[best_idx].clone();
        let Some(oos) = self.evaluate(pair, &best_params, &engine, split.oos_h1, split.oos_m15)
        else {
            return Ok(OptimizationResult::rejected(
                pair,
                combos.len(),
                "selected combination failed the out-of-sample backtest".into(),
            ));
        };

        let failures = evaluate_gates(
            &self.config.gates,
            pair,
            is_trades,
            oos.sharpe_ratio,
            oos.win_rate,
        );

        Ok(OptimizationResult {
            pair: pair.to_string(),
            best_params,
            in_sample_sharpe: is_sharpe,
            in_sample_trades: is_trades,
            out_of_sample_sharpe: oos.sharpe_ratio,
            out_of_sample_win_rate: oos.win_rate,
            out_of_sample_trades: oos.total_trades(),
            total_combinations_tested: combos.len(),
            passed_validation: failures.is_empty(),
            rejection_reason: if failures.is_empty() {
                None
            } else {
                Some(failures.join("; "))
            },
        })
    }

    fn evaluate(
        &self,
        pair: &str,
        combo: &ParameterCombination,
        engine: &BacktestEngine,
        h1: &[Bar],
        m15: &[Bar],
    ) -> Option<BacktestResult> {
        let params = PipelineParams::try_from(combo).ok()?;
        let signals = self.pipeline.generate(pair, &params, h1, m15).ok()?;
        engine.run(pair, &signals).ok()
    }
}

/// Apply every gate and collect the failures; an empty vec means the
/// result passes validation.
fn evaluate_gates(
    gates: &ValidationGates,
    pair: &str,
    is_trades: usize,
    oos_sharpe: f64,
    oos_win_rate: f64,
) -> Vec<String> {
    let mut failures = Vec::new();
    let sharpe_floor = gates.sharpe_floor(pair);
    if oos_sharpe < sharpe_floor {
        failures.push(format!(
            "out-of-sample sharpe {:.3} below {:.3}",
            oos_sharpe, sharpe_floor
        ));
    }
    if oos_win_rate < gates.min_oos_win_rate {
        failures.push(format!(
            "out-of-sample win rate {:.3} below {:.3}",
            oos_win_rate, gates.min_oos_win_rate
        ));
    }
    if is_trades < gates.min_is_trades {
        failures.push(format!(
            "in-sample trades {} below {}",
            is_trades, gates.min_is_trades
        ));
    }
    failures
}

struct SplitFrames<'a> {
    is_h1: &'a [Bar],
    is_m15: &'a [Bar],
    oos_h1: &'a [Bar],
    oos_m15: &'a [Bar],
}

/// Split both frames at the timestamp of the M15 bar sitting at the split
/// ratio: in-sample takes bars at or before it, out-of-sample the rest.
fn split_frames<'a>(
    pair: &str,
    h1: &'a [Bar],
    m15: &'a [Bar],
    ratio: f64,
) -> Result<SplitFrames<'a>, FxgridError> {
    if m15.is_empty() {
        return Err(FxgridError::NoData {
            pair: pair.to_string(),
            timeframe: "M15".into(),
        });
    }
    if h1.is_empty() {
        return Err(FxgridError::NoData {
            pair: pair.to_string(),
            timeframe: "H1".into(),
        });
    }

    let split_idx = ((m15.len() as f64 * ratio) as usize).min(m15.len() - 1);
    let split_time = m15[split_idx].time;

    let m15_cut = m15.partition_point(|b| b.time <= split_time);
    let h1_cut = h1.partition_point(|b| b.time <= split_time);

    let split = SplitFrames {
        is_h1: &h1[..h1_cut],
        is_m15: &m15[..m15_cut],
        oos_h1: &h1[h1_cut..],
        oos_m15: &m15[m15_cut..],
    };

    if split.is_m15.is_empty() || split.oos_m15.is_empty() {
        return Err(FxgridError::NoData {
            pair: pair.to_string(),
            timeframe: "M15 (split leaves an empty window)".into(),
        });
    }
    if split.is_h1.is_empty() || split.oos_h1.is_empty() {
        return Err(FxgridError::NoData {
            pair: pair.to_string(),
            timeframe: "H1 (split leaves an empty window)".into(),
        });
    }

    Ok(split)
}
