//! JSON file persistence for optimization results.
//!
//! The store is a single JSON object keyed by pair. Loading tolerates a
//! missing or corrupt file by returning an empty map: downstream trade-mode
//! resolution then treats every pair as unvalidated, which is the safe
//! default.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::FxgridError;
use crate::domain::optimize::OptimizationResult;
use crate::ports::results_port::ResultsStorePort;

pub struct JsonStoreAdapter {
    path: PathBuf,
}

impl JsonStoreAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ResultsStorePort for JsonStoreAdapter {
    fn save(&self, results: &BTreeMap<String, OptimizationResult>) -> Result<(), FxgridError> {
        let json =
            serde_json::to_string_pretty(results).map_err(|e| FxgridError::MalformedData {
                path: self.path.display().to_string(),
                reason: format!("serialization failed: {}", e),
            })?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn load(&self) -> Result<BTreeMap<String, OptimizationResult>, FxgridError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Ok(BTreeMap::new()),
        };
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::ParameterCombination;
    use std::fs;
    use tempfile::TempDir;

    fn sample_result(pair: &str, passed: bool) -> OptimizationResult {
        let mut params = ParameterCombination::empty();
        params.insert("bb_period", 20.0);
        params.insert("bb_std_dev", 2.0);
        OptimizationResult {
            pair: pair.to_string(),
            best_params: params,
            in_sample_sharpe: 1.2,
            in_sample_trades: 41,
            out_of_sample_sharpe: 0.45,
            out_of_sample_win_rate: 0.55,
            out_of_sample_trades: 17,
            total_combinations_tested: 243,
            passed_validation: passed,
            rejection_reason: if passed {
                None
            } else {
                Some("out-of-sample sharpe 0.100 below 0.300".into())
            },
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonStoreAdapter::new(dir.path().join("results.json"));

        let mut results = BTreeMap::new();
        results.insert("EUR_USD".to_string(), sample_result("EUR_USD", true));
        results.insert("USD_JPY".to_string(), sample_result("USD_JPY", false));
        store.save(&results).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        let eur = &loaded["EUR_USD"];
        assert!(eur.passed_validation);
        assert_eq!(eur.best_params.get("bb_period").unwrap(), 20.0);
        assert_eq!(eur.in_sample_trades, 41);
        assert!(loaded["USD_JPY"].rejection_reason.is_some());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStoreAdapter::new(dir.path().join("nope.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, "{not json at all").unwrap();
        let store = JsonStoreAdapter::new(path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = JsonStoreAdapter::new(dir.path().join("results.json"));

        let mut first = BTreeMap::new();
        first.insert("EUR_USD".to_string(), sample_result("EUR_USD", true));
        store.save(&first).unwrap();

        let mut second = BTreeMap::new();
        second.insert("GBP_USD".to_string(), sample_result("GBP_USD", true));
        store.save(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("GBP_USD"));
    }
}
