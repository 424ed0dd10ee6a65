//! OHLCV bar and enriched signal-row representations.

use chrono::NaiveDateTime;

/// One OHLCV sample for a fixed interval, timestamps in UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// A bar enriched with the columns the simulator consumes.
///
/// `entry_price`, `stop_loss` and `take_profit` are populated only on bars
/// where `signal != 0`; the simulator rejects the run if a signal bar is
/// missing them.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBar {
    pub time: NaiveDateTime,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub signal: i8,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub exit_signal: bool,
}

impl SignalBar {
    /// A flat (no-signal) row for a bar.
    pub fn flat(bar: &Bar) -> Self {
        SignalBar {
            time: bar.time,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            signal: 0,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            exit_signal: false,
        }
    }
}
