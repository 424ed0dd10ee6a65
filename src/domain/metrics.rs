//! Performance metrics over equity curves and trade lists.
//!
//! Every function returns a defined value for degenerate input (empty or
//! constant sequences) so downstream aggregation never needs to handle
//! errors for normal edge cases.

use super::trade::ClosedTrade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Maximum drawdown as a fraction of the running peak (0–1).
///
/// Returns 0.0 when the curve has fewer than 2 points or never declines.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &val in equity_curve {
        if val > peak {
            peak = val;
        }
        let dd = if peak != 0.0 { (peak - val) / peak } else { 0.0 };
        if dd > max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

/// Annualised Sharpe ratio over per-period returns (risk-free rate = 0,
/// sample standard deviation, √252 annualisation).
///
/// Returns 0.0 for fewer than 2 observations or zero variance.
pub fn sharpe(returns: &[f64]) -> f64 {
    let n = returns.len();
    if n < 2 {
        return 0.0;
    }

    let mean = returns.iter().sum::<f64>() / n as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    let stddev = variance.sqrt();

    if stddev == 0.0 {
        return 0.0;
    }

    (mean / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Gross profit / gross loss. `f64::INFINITY` when there are winners but no
/// losers, 0.0 when there are no winners.
pub fn profit_factor(trades: &[ClosedTrade]) -> f64 {
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.pnl_usd > 0.0)
        .map(|t| t.pnl_usd)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl_usd < 0.0)
        .map(|t| t.pnl_usd)
        .sum::<f64>()
        .abs();

    if gross_loss == 0.0 {
        if gross_profit > 0.0 { f64::INFINITY } else { 0.0 }
    } else {
        gross_profit / gross_loss
    }
}

/// Fraction of trades with positive P&L; 0.0 for an empty list.
pub fn win_rate(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Per-period returns from consecutive equity values.
pub fn equity_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}
