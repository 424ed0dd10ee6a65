//! Bollinger Bands plus the derived width and %B columns.
//!
//! - Middle: SMA of close over `period`
//! - Upper/Lower: middle ± multiplier × population standard deviation
//!   (divides by N, not N-1)
//! - Width: (upper − lower) / middle, a scale-free band measure
//! - %B: (close − lower) / (upper − lower), position of the close within
//!   the band; `None` when the band has zero range
//!
//! Warmup: first (period-1) bars are `None` in every column.

use crate::domain::bar::Bar;

#[derive(Debug, Clone)]
pub struct BollingerColumns {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub width: Vec<Option<f64>>,
    pub pct_b: Vec<Option<f64>>,
}

pub fn bollinger(bars: &[Bar], period: usize, multiplier: f64) -> BollingerColumns {
    let n = bars.len();
    let mut cols = BollingerColumns {
        upper: Vec::with_capacity(n),
        middle: Vec::with_capacity(n),
        lower: Vec::with_capacity(n),
        width: Vec::with_capacity(n),
        pct_b: Vec::with_capacity(n),
    };

    for i in 0..n {
        if period == 0 || i + 1 < period {
            cols.upper.push(None);
            cols.middle.push(None);
            cols.lower.push(None);
            cols.width.push(None);
            cols.pct_b.push(None);
            continue;
        }

        let window = &bars[i + 1 - period..=i];
        let mean: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        let variance: f64 = window
            .iter()
            .map(|b| {
                let diff = b.close - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();

        let upper = mean + multiplier * stddev;
        let lower = mean - multiplier * stddev;
        let range = upper - lower;

        cols.upper.push(Some(upper));
        cols.middle.push(Some(mean));
        cols.lower.push(Some(lower));
        cols.width.push(if mean != 0.0 {
            Some(range / mean)
        } else {
            None
        });
        cols.pct_b.push(if range != 0.0 {
            Some((bars[i].close - lower) / range)
        } else {
            None
        });
    }

    cols
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                time: NaiveDate::from_ymd_opt(2024, 1, 2)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::minutes(15 * i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn bollinger_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let cols = bollinger(&bars, 3, 2.0);

        assert!(cols.middle[0].is_none());
        assert!(cols.middle[1].is_none());
        assert!(cols.middle[2].is_some());
        assert!(cols.width[1].is_none());
        assert!(cols.pct_b[4].is_some());
    }

    #[test]
    fn bollinger_population_stddev() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let cols = bollinger(&bars, 3, 2.0);

        let mean = 20.0;
        let variance = ((10.0_f64 - mean).powi(2) + (30.0_f64 - mean).powi(2)) / 3.0;
        let stddev = variance.sqrt();

        assert!((cols.middle[2].unwrap() - mean).abs() < 1e-10);
        assert!((cols.upper[2].unwrap() - (mean + 2.0 * stddev)).abs() < 1e-10);
        assert!((cols.lower[2].unwrap() - (mean - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn constant_prices_collapse_the_band() {
        let bars = make_bars(&[100.0, 100.0, 100.0]);
        let cols = bollinger(&bars, 3, 2.0);

        assert_eq!(cols.upper[2], Some(100.0));
        assert_eq!(cols.lower[2], Some(100.0));
        assert_eq!(cols.width[2], Some(0.0));
        // Zero-range band: %B is undefined.
        assert_eq!(cols.pct_b[2], None);
    }

    #[test]
    fn width_is_scale_free() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let scaled = make_bars(&[100.0, 200.0, 300.0]);
        let a = bollinger(&bars, 3, 2.0);
        let b = bollinger(&scaled, 3, 2.0);
        assert!((a.width[2].unwrap() - b.width[2].unwrap()).abs() < 1e-10);
    }

    #[test]
    fn pct_b_position_within_band() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let cols = bollinger(&bars, 3, 2.0);

        let upper = cols.upper[2].unwrap();
        let lower = cols.lower[2].unwrap();
        let expected = (30.0 - lower) / (upper - lower);
        assert!((cols.pct_b[2].unwrap() - expected).abs() < 1e-10);
        // Last close is above the mean, so %B is above 0.5.
        assert!(cols.pct_b[2].unwrap() > 0.5);
    }
}
