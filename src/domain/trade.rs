//! Trade lifecycle: an open position and the closed record it becomes.
//!
//! The lifecycle is encoded in the types: [`OpenTrade::open`] validates the
//! stop-loss side and returns an open position; [`OpenTrade::close`] consumes
//! it and returns a [`ClosedTrade`] with exit fields and realized P&L. There
//! is no "open trade with unset exit fields" state to represent.

use chrono::NaiveDateTime;

use super::error::FxgridError;
use super::instrument::{pip_size, quoted_in_account_currency};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn from_signal(signal: i8) -> Option<Self> {
        match signal {
            1 => Some(Direction::Long),
            -1 => Some(Direction::Short),
            _ => None,
        }
    }

    /// +1.0 for long, -1.0 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    ExitSignal,
    EndOfData,
}

/// An open position awaiting an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTrade {
    pub pair: String,
    pub direction: Direction,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub units: i64,
}

/// The sealed record of a completed trade.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub pair: String,
    pub direction: Direction,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub units: i64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub pnl_pips: f64,
    pub pnl_usd: f64,
}

impl OpenTrade {
    /// Open a position. Fails when the stop-loss is on the wrong side of the
    /// entry price for the direction: long requires stop below entry, short
    /// requires stop above.
    pub fn open(
        pair: &str,
        direction: Direction,
        entry_time: NaiveDateTime,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        units: i64,
    ) -> Result<Self, FxgridError> {
        let stop_ok = match direction {
            Direction::Long => stop_loss < entry_price,
            Direction::Short => stop_loss > entry_price,
        };
        if !stop_ok {
            return Err(FxgridError::InvalidStop {
                direction: direction.name(),
                entry_price,
                stop_loss,
            });
        }

        Ok(OpenTrade {
            pair: pair.to_string(),
            direction,
            entry_time,
            entry_price,
            stop_loss,
            take_profit,
            units,
        })
    }

    /// Close the position, computing realized P&L in pips and in account
    /// currency. Balance updates are the caller's responsibility.
    pub fn close(
        self,
        exit_time: NaiveDateTime,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> ClosedTrade {
        let price_diff = (exit_price - self.entry_price) * self.direction.sign();
        let pnl_pips = price_diff / pip_size(&self.pair);

        let pnl_usd = if quoted_in_account_currency(&self.pair) {
            price_diff * self.units as f64
        } else {
            // Quote-currency P&L converted to USD at the exit price.
            (price_diff / exit_price) * self.units as f64
        };

        ClosedTrade {
            pair: self.pair,
            direction: self.direction,
            entry_time: self.entry_time,
            entry_price: self.entry_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            units: self.units,
            exit_time,
            exit_price,
            exit_reason,
            pnl_pips,
            pnl_usd,
        }
    }
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.pnl_usd > 0.0
    }
}
