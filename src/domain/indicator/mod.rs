//! Technical indicators as per-bar columns.
//!
//! Each indicator returns `Vec<Option<f64>>` aligned with the input bars:
//! `None` marks warmup bars where the window is not yet full. Downstream
//! classification treats `None` as "condition not met" rather than an error.

pub mod atr;
pub mod bollinger;
pub mod ema;

pub use atr::{atr, atr_ratio};
pub use bollinger::{BollingerColumns, bollinger};
pub use ema::{ema, ema_cross};

/// Simple moving average over a trailing window; `None` until the window
/// fills. `None` inputs keep the output `None` until enough values have
/// accumulated past them.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if period == 0 || i + 1 < period {
            out.push(None);
            continue;
        }
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_none()) {
            out.push(None);
            continue;
        }
        let sum: f64 = window.iter().map(|v| v.unwrap_or(0.0)).sum();
        out.push(Some(sum / period as f64));
    }
    out
}
