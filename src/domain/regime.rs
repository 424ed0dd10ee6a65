//! Market regime classification from volatility and trend columns.
//!
//! Per bar the regime is one of:
//! - `Trending`: the EMA cross flipped within the last 2 bars, or the ATR
//!   ratio reads above 1.5× the configured threshold.
//! - `Ranging`: band width sits inside the configured corridor, the ATR
//!   ratio is below threshold, and the EMA cross has been stable for the
//!   last 3 bars. Ranging takes precedence over trending when both hold.
//! - `Neutral` otherwise, including wherever an input column is `None`.

use super::error::FxgridError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Ranging,
    Trending,
    Neutral,
}

/// Thresholds for regime classification, validated at construction.
#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    pub bb_width_threshold: f64,
    pub min_bb_width: f64,
    pub atr_ratio_threshold: f64,
}

const TRENDING_ATR_MULT: f64 = 1.5;
const CROSS_FLIP_LOOKBACK: usize = 2;
const CROSS_STABLE_LOOKBACK: usize = 3;

impl RegimeClassifier {
    pub fn new(
        bb_width_threshold: f64,
        min_bb_width: f64,
        atr_ratio_threshold: f64,
    ) -> Result<Self, FxgridError> {
        if min_bb_width >= bb_width_threshold {
            return Err(FxgridError::ConfigInvalid {
                section: "regime".into(),
                key: "min_bb_width".into(),
                reason: format!(
                    "min_bb_width ({min_bb_width}) must be below bb_width_threshold ({bb_width_threshold})"
                ),
            });
        }
        Ok(RegimeClassifier {
            bb_width_threshold,
            min_bb_width,
            atr_ratio_threshold,
        })
    }

    /// Classify every bar given aligned indicator columns.
    pub fn classify(
        &self,
        bb_width: &[Option<f64>],
        atr_ratio: &[Option<f64>],
        ema_cross: &[Option<i8>],
    ) -> Vec<Regime> {
        let n = bb_width.len();
        let mut out = Vec::with_capacity(n);

        for i in 0..n {
            let flipped = cross_flipped_within(ema_cross, i, CROSS_FLIP_LOOKBACK);
            let vol_spike = matches!(
                atr_ratio[i],
                Some(r) if r > TRENDING_ATR_MULT * self.atr_ratio_threshold
            );

            let width_in_corridor = matches!(
                bb_width[i],
                Some(w) if w > self.min_bb_width && w < self.bb_width_threshold
            );
            let vol_quiet = matches!(atr_ratio[i], Some(r) if r < self.atr_ratio_threshold);
            let cross_stable = cross_stable_for(ema_cross, i, CROSS_STABLE_LOOKBACK);

            let regime = if width_in_corridor && vol_quiet && cross_stable {
                Regime::Ranging
            } else if flipped || vol_spike {
                Regime::Trending
            } else {
                Regime::Neutral
            };
            out.push(regime);
        }

        out
    }
}

/// True when the cross sign differs between any adjacent pair inside the
/// trailing window. Missing values never count as a flip.
fn cross_flipped_within(cross: &[Option<i8>], i: usize, lookback: usize) -> bool {
    (0..lookback).any(|back| {
        let j = match i.checked_sub(back) {
            Some(j) if j >= 1 => j,
            _ => return false,
        };
        matches!((cross[j], cross[j - 1]), (Some(a), Some(b)) if a != b)
    })
}

/// True only when every adjacent pair inside the trailing window is present
/// and equal.
fn cross_stable_for(cross: &[Option<i8>], i: usize, lookback: usize) -> bool {
    (0..lookback).all(|back| {
        let j = match i.checked_sub(back) {
            Some(j) if j >= 1 => j,
            _ => return false,
        };
        matches!((cross[j], cross[j - 1]), (Some(a), Some(b)) if a == b)
    })
}
