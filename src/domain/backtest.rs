//! Bar-by-bar backtesting engine with stop-loss/take-profit simulation.
//!
//! Rules:
//! - One open trade at a time (no pyramiding); a signal while a trade is
//!   open is ignored.
//! - Each bar while a trade is open: stop-loss is checked against the bar's
//!   high/low **before** take-profit, so when both are breached the trade
//!   closes at the stop price. The exit-signal flag closes at the bar close.
//! - A trade opened on a bar is first eligible for exits on the next bar.
//! - Balance compounds: each close adds pnl_usd, and sizing for the next
//!   trade sees the updated balance. The equity curve records the balance
//!   at every bar.
//! - Any trade still open after the last bar is force-closed at that bar's
//!   close with reason `end_of_data`.

use super::bar::SignalBar;
use super::error::FxgridError;
use super::metrics;
use super::sizing;
use super::trade::{ClosedTrade, Direction, ExitReason, OpenTrade};

/// Engine parameters, validated at construction.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    pub initial_balance: f64,
    pub risk_pct: f64,
}

/// Aggregated performance for a single pair backtest. Metrics are computed
/// once at construction; the value is immutable afterwards.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub pair: String,
    pub trades: Vec<ClosedTrade>,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub equity_curve: Vec<f64>,
    /// Signals dropped because the trade could not be constructed (bad stop
    /// side or unsizable) — reported, never fatal.
    pub skipped_signals: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub avg_pips_per_trade: f64,
}

impl BacktestResult {
    fn new(
        pair: String,
        trades: Vec<ClosedTrade>,
        initial_balance: f64,
        final_balance: f64,
        equity_curve: Vec<f64>,
        skipped_signals: usize,
    ) -> Self {
        let returns = metrics::equity_returns(&equity_curve);
        let sharpe_ratio = if trades.is_empty() {
            0.0
        } else {
            metrics::sharpe(&returns)
        };
        let avg_pips_per_trade = if trades.is_empty() {
            0.0
        } else {
            trades.iter().map(|t| t.pnl_pips).sum::<f64>() / trades.len() as f64
        };

        BacktestResult {
            win_rate: metrics::win_rate(&trades),
            profit_factor: metrics::profit_factor(&trades),
            max_drawdown: metrics::max_drawdown(&equity_curve),
            sharpe_ratio,
            avg_pips_per_trade,
            pair,
            trades,
            initial_balance,
            final_balance,
            equity_curve,
            skipped_signals,
        }
    }

    pub fn total_trades(&self) -> usize {
        self.trades.len()
    }

    pub fn total_return_pct(&self) -> f64 {
        if self.initial_balance == 0.0 {
            return 0.0;
        }
        (self.final_balance - self.initial_balance) / self.initial_balance * 100.0
    }
}

impl BacktestEngine {
    pub fn new(initial_balance: f64, risk_pct: f64) -> Result<Self, FxgridError> {
        if initial_balance <= 0.0 {
            return Err(FxgridError::ConfigInvalid {
                section: "backtest".into(),
                key: "initial_balance".into(),
                reason: format!("must be positive, got {initial_balance}"),
            });
        }
        if !(0.001..=0.05).contains(&risk_pct) {
            return Err(FxgridError::ConfigInvalid {
                section: "backtest".into(),
                key: "risk_pct".into(),
                reason: format!("must be in [0.001, 0.05], got {risk_pct}"),
            });
        }
        Ok(BacktestEngine {
            initial_balance,
            risk_pct,
        })
    }

    /// Execute a bar-by-bar backtest over an enriched bar sequence.
    pub fn run(&self, pair: &str, bars: &[SignalBar]) -> Result<BacktestResult, FxgridError> {
        validate_bars(pair, bars)?;

        let mut balance = self.initial_balance;
        let mut equity_curve = vec![balance];
        let mut trades: Vec<ClosedTrade> = Vec::new();
        let mut open_trade: Option<OpenTrade> = None;
        let mut skipped_signals = 0usize;

        for bar in bars {
            if let Some(trade) = open_trade.take() {
                match check_exit(trade, bar) {
                    ExitCheck::Closed(closed) => {
                        balance += closed.pnl_usd;
                        trades.push(closed);
                    }
                    ExitCheck::StillOpen(trade) => open_trade = Some(trade),
                }
            }

            if open_trade.is_none()
                && let Some(direction) = Direction::from_signal(bar.signal)
            {
                // Validated upfront, so signal bars always carry these.
                let entry_price = bar.entry_price.unwrap_or(bar.close);
                let stop_loss = bar.stop_loss.unwrap_or(bar.close);
                let take_profit = bar.take_profit.unwrap_or(bar.close);

                match open_from_signal(
                    pair,
                    direction,
                    bar,
                    entry_price,
                    stop_loss,
                    take_profit,
                    balance,
                    self.risk_pct,
                ) {
                    Ok(trade) => open_trade = Some(trade),
                    Err(_) => skipped_signals += 1,
                }
            }

            equity_curve.push(balance);
        }

        if let Some(trade) = open_trade {
            let last = &bars[bars.len() - 1];
            let closed = trade.close(last.time, last.close, ExitReason::EndOfData);
            balance += closed.pnl_usd;
            trades.push(closed);
            equity_curve.push(balance);
        }

        Ok(BacktestResult::new(
            pair.to_string(),
            trades,
            self.initial_balance,
            balance,
            equity_curve,
            skipped_signals,
        ))
    }
}

enum ExitCheck {
    Closed(ClosedTrade),
    StillOpen(OpenTrade),
}

/// Check stop-loss, take-profit, then the exit-signal flag, in that order.
fn check_exit(trade: OpenTrade, bar: &SignalBar) -> ExitCheck {
    match trade.direction {
        Direction::Long => {
            if bar.low <= trade.stop_loss {
                let stop = trade.stop_loss;
                return ExitCheck::Closed(trade.close(bar.time, stop, ExitReason::StopLoss));
            }
            if bar.high >= trade.take_profit {
                let target = trade.take_profit;
                return ExitCheck::Closed(trade.close(bar.time, target, ExitReason::TakeProfit));
            }
        }
        Direction::Short => {
            if bar.high >= trade.stop_loss {
                let stop = trade.stop_loss;
                return ExitCheck::Closed(trade.close(bar.time, stop, ExitReason::StopLoss));
            }
            if bar.low <= trade.take_profit {
                let target = trade.take_profit;
                return ExitCheck::Closed(trade.close(bar.time, target, ExitReason::TakeProfit));
            }
        }
    }

    if bar.exit_signal {
        return ExitCheck::Closed(trade.close(bar.time, bar.close, ExitReason::ExitSignal));
    }

    ExitCheck::StillOpen(trade)
}

#[allow(clippy::too_many_arguments)]
fn open_from_signal(
    pair: &str,
    direction: Direction,
    bar: &SignalBar,
    entry_price: f64,
    stop_loss: f64,
    take_profit: f64,
    balance: f64,
    risk_pct: f64,
) -> Result<OpenTrade, FxgridError> {
    let units = sizing::calculate_units(balance, risk_pct, entry_price, stop_loss)?;
    OpenTrade::open(
        pair,
        direction,
        bar.time,
        entry_price,
        stop_loss,
        take_profit,
        units,
    )
}

fn validate_bars(pair: &str, bars: &[SignalBar]) -> Result<(), FxgridError> {
    if bars.is_empty() {
        return Err(FxgridError::NoData {
            pair: pair.to_string(),
            timeframe: "signals".into(),
        });
    }

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 && bar.time <= bars[i - 1].time {
            return Err(FxgridError::UnsortedData {
                pair: pair.to_string(),
                index: i,
            });
        }
        if bar.signal != 0 {
            let field = if bar.entry_price.is_none() {
                Some("entry_price")
            } else if bar.stop_loss.is_none() {
                Some("stop_loss")
            } else if bar.take_profit.is_none() {
                Some("take_profit")
            } else {
                None
            };
            if let Some(field) = field {
                return Err(FxgridError::MissingSignalFields {
                    pair: pair.to_string(),
                    index: i,
                    field,
                });
            }
        }
    }

    Ok(())
}
