//! Optimization results persistence port trait.

use std::collections::BTreeMap;

use crate::domain::error::FxgridError;
use crate::domain::optimize::OptimizationResult;

pub trait ResultsStorePort {
    fn save(&self, results: &BTreeMap<String, OptimizationResult>) -> Result<(), FxgridError>;

    /// Stored results keyed by pair. A missing or unreadable store loads as
    /// empty so downstream mode resolution falls back to paper trading.
    fn load(&self) -> Result<BTreeMap<String, OptimizationResult>, FxgridError>;
}
