//! Average True Range and the ATR ratio used for regime detection.
//!
//! True range per bar is max(high − low, |high − prev_close|,
//! |low − prev_close|); the first bar has no previous close and uses
//! high − low. ATR is the SMA of true range over `period`, and the ATR
//! ratio divides it by its own 20-bar SMA so the volatility reading is
//! comparable across instruments.

use crate::domain::bar::Bar;
use crate::domain::indicator::rolling_mean;

/// Window for the ATR ratio denominator.
pub const ATR_BASELINE_PERIOD: usize = 20;

pub fn atr(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let tr = true_ranges(bars);
    rolling_mean(&tr, period)
}

/// Current ATR relative to its recent baseline. Values above 1.0 mean
/// volatility is expanding.
pub fn atr_ratio(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let atr_col = atr(bars, period);
    let baseline = rolling_mean(&atr_col, ATR_BASELINE_PERIOD);

    atr_col
        .iter()
        .zip(baseline.iter())
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if *b != 0.0 => Some(a / b),
            _ => None,
        })
        .collect()
}

fn true_ranges(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                Some(bar.high - bar.low)
            } else {
                Some(bar.true_range(bars[i - 1].close))
            }
        })
        .collect()
}
