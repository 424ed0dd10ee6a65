//! Typed strategy parameters and per-pair defaults.
//!
//! The optimizer works in untyped parameter space
//! ([`ParameterCombination`]); the signal pipeline works with this struct.
//! The conversion is the single place where axis names are interpreted, so
//! a combination missing an axis fails loudly instead of picking up a
//! silent default.

use super::error::FxgridError;
use super::grid::ParameterCombination;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub atr_period: usize,
    pub bb_width_threshold: f64,
    pub min_bb_width: f64,
    pub atr_ratio_threshold: f64,
    pub ema_fast: usize,
    pub ema_slow: usize,
}

impl TryFrom<&ParameterCombination> for PipelineParams {
    type Error = FxgridError;

    fn try_from(combo: &ParameterCombination) -> Result<Self, Self::Error> {
        Ok(PipelineParams {
            bb_period: combo.get_usize("bb_period")?,
            bb_std_dev: combo.get("bb_std_dev")?,
            atr_period: combo.get_usize("atr_period")?,
            bb_width_threshold: combo.get("bb_width_threshold")?,
            min_bb_width: combo.get("min_bb_width")?,
            atr_ratio_threshold: combo.get("atr_ratio_threshold")?,
            ema_fast: combo.get_usize("ema_fast")?,
            ema_slow: combo.get_usize("ema_slow")?,
        })
    }
}

impl PipelineParams {
    /// Middle-of-the-grid parameters used when no optimization result is
    /// available for a pair. JPY crosses get the tighter width floor their
    /// search grids use.
    pub fn default_for_pair(pair: &str) -> Self {
        let min_bb_width = match pair {
            "GBP_JPY" | "USD_JPY" => 0.0006,
            _ => 0.0008,
        };
        PipelineParams {
            bb_period: 20,
            bb_std_dev: if pair == "GBP_JPY" { 2.5 } else { 2.0 },
            atr_period: 14,
            bb_width_threshold: 0.002,
            min_bb_width,
            atr_ratio_threshold: 0.9,
            ema_fast: 8,
            ema_slow: 21,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_round_trip() {
        let mut combo = ParameterCombination::empty();
        combo.insert("bb_period", 20.0);
        combo.insert("bb_std_dev", 2.2);
        combo.insert("atr_period", 14.0);
        combo.insert("bb_width_threshold", 0.002);
        combo.insert("min_bb_width", 0.0008);
        combo.insert("atr_ratio_threshold", 0.9);
        combo.insert("ema_fast", 8.0);
        combo.insert("ema_slow", 21.0);

        let params = PipelineParams::try_from(&combo).unwrap();
        assert_eq!(params.bb_period, 20);
        assert_eq!(params.bb_std_dev, 2.2);
        assert_eq!(params.ema_slow, 21);
    }

    #[test]
    fn missing_axis_is_an_error() {
        let mut combo = ParameterCombination::empty();
        combo.insert("bb_period", 20.0);
        let result = PipelineParams::try_from(&combo);
        assert!(matches!(result, Err(FxgridError::MissingAxis { .. })));
    }

    #[test]
    fn per_pair_defaults() {
        let eur = PipelineParams::default_for_pair("EUR_USD");
        assert_eq!(eur.bb_std_dev, 2.0);
        assert_eq!(eur.min_bb_width, 0.0008);

        let gbp_jpy = PipelineParams::default_for_pair("GBP_JPY");
        assert_eq!(gbp_jpy.bb_std_dev, 2.5);
        assert_eq!(gbp_jpy.min_bb_width, 0.0006);

        let usd_jpy = PipelineParams::default_for_pair("USD_JPY");
        assert_eq!(usd_jpy.bb_std_dev, 2.0);
        assert_eq!(usd_jpy.min_bb_width, 0.0006);
    }

    #[test]
    fn defaults_keep_width_corridor_ordered() {
        for pair in ["EUR_USD", "GBP_USD", "USD_JPY", "GBP_JPY"] {
            let p = PipelineParams::default_for_pair(pair);
            assert!(p.min_bb_width < p.bb_width_threshold);
        }
    }
}
