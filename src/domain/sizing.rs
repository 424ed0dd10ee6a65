//! Risk-based position sizing.
//!
//! units = round(balance × risk_fraction / |entry − stop|), always ≥ 0; the
//! trade direction carries the sign.

use super::error::FxgridError;

/// Calculate the unit count for a trade, re-evaluated against the current
/// (compounding) balance at each open.
pub fn calculate_units(
    account_balance: f64,
    risk_fraction: f64,
    entry_price: f64,
    stop_loss: f64,
) -> Result<i64, FxgridError> {
    if account_balance <= 0.0 {
        return Err(FxgridError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_balance".into(),
            reason: format!("account balance must be positive, got {account_balance}"),
        });
    }
    if risk_fraction <= 0.0 || risk_fraction > 1.0 {
        return Err(FxgridError::ConfigInvalid {
            section: "backtest".into(),
            key: "risk_pct".into(),
            reason: format!("risk fraction must be in (0, 1], got {risk_fraction}"),
        });
    }

    let distance = (entry_price - stop_loss).abs();
    if distance == 0.0 {
        return Err(FxgridError::InvalidStop {
            direction: "flat",
            entry_price,
            stop_loss,
        });
    }

    let units = account_balance * risk_fraction / distance;
    Ok(units.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_by_risk_and_stop_distance() {
        // 10_000 * 0.01 / 0.0050 = 20_000 units
        let units = calculate_units(10_000.0, 0.01, 1.1000, 1.0950).unwrap();
        assert_eq!(units, 20_000);
    }

    #[test]
    fn sizing_scales_with_balance() {
        let small = calculate_units(10_000.0, 0.01, 1.1000, 1.0950).unwrap();
        let big = calculate_units(20_000.0, 0.01, 1.1000, 1.0950).unwrap();
        assert_eq!(big, small * 2);
    }

    #[test]
    fn rejects_non_positive_balance() {
        assert!(calculate_units(0.0, 0.01, 1.1, 1.09).is_err());
        assert!(calculate_units(-100.0, 0.01, 1.1, 1.09).is_err());
    }

    #[test]
    fn rejects_risk_out_of_range() {
        assert!(calculate_units(10_000.0, 0.0, 1.1, 1.09).is_err());
        assert!(calculate_units(10_000.0, 1.5, 1.1, 1.09).is_err());
    }

    #[test]
    fn rejects_zero_stop_distance() {
        assert!(calculate_units(10_000.0, 0.01, 1.1, 1.1).is_err());
    }

    #[test]
    fn rounds_to_nearest_unit() {
        // 10_000 * 0.01 / 0.0003 = 333_333.33…
        let units = calculate_units(10_000.0, 0.01, 1.1003, 1.1000).unwrap();
        assert_eq!(units, 333_333);
    }
}
