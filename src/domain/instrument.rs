//! Per-instrument quoting conventions.
//!
//! Pairs quoted in JPY use a 0.01 pip and require converting P&L from the
//! quote currency at the exit price; everything else is USD-quoted with a
//! 0.0001 pip and converts directly.

/// Pip size for a pair: 0.01 for JPY-quoted pairs, 0.0001 otherwise.
pub fn pip_size(pair: &str) -> f64 {
    if is_jpy_pair(pair) { 0.01 } else { 0.0001 }
}

/// True when the pair's quote currency is the account currency (USD), so
/// `pnl_usd = price_diff * units` without conversion.
pub fn quoted_in_account_currency(pair: &str) -> bool {
    !is_jpy_pair(pair)
}

fn is_jpy_pair(pair: &str) -> bool {
    pair.contains("JPY")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pip_size_major_pairs() {
        assert!((pip_size("EUR_USD") - 0.0001).abs() < f64::EPSILON);
        assert!((pip_size("GBP_USD") - 0.0001).abs() < f64::EPSILON);
    }

    #[test]
    fn pip_size_jpy_pairs() {
        assert!((pip_size("USD_JPY") - 0.01).abs() < f64::EPSILON);
        assert!((pip_size("GBP_JPY") - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn quote_convention() {
        assert!(quoted_in_account_currency("EUR_USD"));
        assert!(!quoted_in_account_currency("USD_JPY"));
    }
}
