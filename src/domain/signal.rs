//! Band-reversion signal generation over dual-timeframe bars.
//!
//! The hourly frame supplies regime context; the 15-minute frame supplies
//! entries. Each M15 bar is matched with the most recent H1 bar at or
//! before it (backward alignment), and entries are only emitted when that
//! H1 bar classifies as ranging and the session allows trading.
//!
//! Entries fire on a close crossing back inside the band:
//! - Long: previous close below the lower band, current close back above
//!   it, with %B still in the bottom decile.
//! - Short: the mirror image at the upper band, %B in the top decile.
//!
//! Stops are 1.5 ATR beyond the entry; the target is the band middle. The
//! exit flag is raised when the aligned H1 regime leaves ranging or the
//! M15 EMA cross flips sign.

use super::bar::{Bar, SignalBar};
use super::error::FxgridError;
use super::indicator::{atr, atr_ratio, bollinger, ema, ema_cross};
use super::params::PipelineParams;
use super::regime::{Regime, RegimeClassifier};
use super::session::Session;

const STOP_ATR_MULT: f64 = 1.5;
const LONG_PCT_B_MAX: f64 = 0.10;
const SHORT_PCT_B_MIN: f64 = 0.90;

/// Build the signal-annotated M15 sequence for one pair.
pub fn generate_signals(
    pair: &str,
    params: &PipelineParams,
    h1: &[Bar],
    m15: &[Bar],
) -> Result<Vec<SignalBar>, FxgridError> {
    validate_frame(pair, "H1", h1)?;
    validate_frame(pair, "M15", m15)?;

    let h1_regimes = classify_h1(params, h1)?;
    let aligned = align_backward(h1, &h1_regimes, m15);

    let bands = bollinger(m15, params.bb_period, params.bb_std_dev);
    let atr_col = atr(m15, params.atr_period);
    let fast = ema(m15, params.ema_fast);
    let slow = ema(m15, params.ema_slow);
    let cross = ema_cross(&fast, &slow);

    let mut out = Vec::with_capacity(m15.len());
    for (i, bar) in m15.iter().enumerate() {
        let mut sb = SignalBar::flat(bar);

        if i > 0 {
            let regime_left_ranging =
                aligned[i - 1] == Some(Regime::Ranging) && aligned[i] != Some(Regime::Ranging);
            let cross_flipped =
                matches!((cross[i], cross[i - 1]), (Some(a), Some(b)) if a != b);
            sb.exit_signal = regime_left_ranging || cross_flipped;
        }

        let in_ranging_context =
            aligned[i] == Some(Regime::Ranging) && Session::classify(bar.time).tradeable();

        if in_ranging_context && i > 0 {
            let prev_close = m15[i - 1].close;
            if let (Some(lower), Some(upper), Some(middle), Some(pct_b), Some(atr_val)) = (
                bands.lower[i],
                bands.upper[i],
                bands.middle[i],
                bands.pct_b[i],
                atr_col[i],
            ) {
                if prev_close < lower && bar.close > lower && pct_b < LONG_PCT_B_MAX {
                    sb.signal = 1;
                    sb.entry_price = Some(bar.close);
                    sb.stop_loss = Some(bar.close - STOP_ATR_MULT * atr_val);
                    sb.take_profit = Some(middle);
                } else if prev_close > upper && bar.close < upper && pct_b > SHORT_PCT_B_MIN {
                    sb.signal = -1;
                    sb.entry_price = Some(bar.close);
                    sb.stop_loss = Some(bar.close + STOP_ATR_MULT * atr_val);
                    sb.take_profit = Some(middle);
                }
            }
        }

        out.push(sb);
    }

    Ok(out)
}

fn classify_h1(params: &PipelineParams, h1: &[Bar]) -> Result<Vec<Regime>, FxgridError> {
    let bands = bollinger(h1, params.bb_period, params.bb_std_dev);
    let ratio = atr_ratio(h1, params.atr_period);
    let fast = ema(h1, params.ema_fast);
    let slow = ema(h1, params.ema_slow);
    let cross = ema_cross(&fast, &slow);

    let classifier = RegimeClassifier::new(
        params.bb_width_threshold,
        params.min_bb_width,
        params.atr_ratio_threshold,
    )?;
    Ok(classifier.classify(&bands.width, &ratio, &cross))
}

/// For each M15 bar, the regime of the latest H1 bar at or before it.
/// `None` before the first H1 bar. Both frames are sorted, so a single
/// forward walk suffices.
fn align_backward(h1: &[Bar], h1_regimes: &[Regime], m15: &[Bar]) -> Vec<Option<Regime>> {
    let mut out = Vec::with_capacity(m15.len());
    let mut h1_idx = 0usize;

    for bar in m15 {
        while h1_idx + 1 < h1.len() && h1[h1_idx + 1].time <= bar.time {
            h1_idx += 1;
        }
        if h1.is_empty() || h1[h1_idx].time > bar.time {
            out.push(None);
        } else {
            out.push(Some(h1_regimes[h1_idx]));
        }
    }

    out
}

fn validate_frame(pair: &str, timeframe: &str, bars: &[Bar]) -> Result<(), FxgridError> {
    if bars.is_empty() {
        return Err(FxgridError::NoData {
            pair: pair.to_string(),
            timeframe: timeframe.to_string(),
        });
    }
    for i in 1..bars.len() {
        if bars[i].time <= bars[i - 1].time {
            return Err(FxgridError::UnsortedData {
                pair: pair.to_string(),
                index: i,
            });
        }
    }
    Ok(())
}
