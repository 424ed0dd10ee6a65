//! Exponential Moving Average and the fast/slow cross column.
//!
//! k = 2/(n+1), seeded with the first close, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). Every bar carries a value; the first
//! few are dominated by the seed rather than being cut off as warmup.

use crate::domain::bar::Bar;

pub fn ema(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    if period == 0 || bars.is_empty() {
        return vec![None; bars.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(bars.len());
    let mut current = bars[0].close;
    out.push(Some(current));

    for bar in &bars[1..] {
        current = bar.close * k + current * (1.0 - k);
        out.push(Some(current));
    }

    out
}

/// +1 where the fast EMA is at or above the slow EMA, -1 below, `None` where
/// either input is missing.
pub fn ema_cross(fast: &[Option<f64>], slow: &[Option<f64>]) -> Vec<Option<i8>> {
    fast.iter()
        .zip(slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(if f >= s { 1 } else { -1 }),
            _ => None,
        })
        .collect()
}
