//! Price data access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::FxgridError;

pub trait DataPort {
    /// Bars for one pair and timeframe ("M15", "H1"), sorted by time
    /// ascending.
    fn fetch_bars(&self, pair: &str, timeframe: &str) -> Result<Vec<Bar>, FxgridError>;
}
