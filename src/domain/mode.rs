//! Trade-mode resolution from stored optimization results.
//!
//! A pair trades live only when its stored result passed validation.
//! Anything else - no stored result, or a result that failed a gate -
//! resolves to paper. An empty store therefore puts every pair on paper.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::optimize::OptimizationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeMode {
    Live,
    Paper,
}

pub fn resolve_modes(
    pairs: &[String],
    results: &BTreeMap<String, OptimizationResult>,
) -> BTreeMap<String, TradeMode> {
    pairs
        .iter()
        .map(|pair| {
            let mode = match results.get(pair) {
                Some(r) if r.passed_validation => TradeMode::Live,
                _ => TradeMode::Paper,
            };
            (pair.clone(), mode)
        })
        .collect()
}
