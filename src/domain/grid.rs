//! Parameter grids for exhaustive strategy search.
//!
//! A grid is an ordered list of named axes, each with its candidate values,
//! plus fixed parameters folded into every combination. Enumeration is a
//! Cartesian product in lexicographic nesting order: the first axis varies
//! slowest, the last axis fastest, so a given grid always yields the same
//! combination sequence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::FxgridError;

/// Hard cap on combinations per pair; grids above it are refused rather
/// than silently truncated.
pub const MAX_COMBINATIONS: usize = 500;

/// One point in parameter space. Keys are sorted, so serialized output is
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterCombination(BTreeMap<String, f64>);

impl ParameterCombination {
    pub fn empty() -> Self {
        ParameterCombination(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.0.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Result<f64, FxgridError> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| FxgridError::MissingAxis {
                name: name.to_string(),
            })
    }

    /// Integer-valued axes (periods, lookbacks) are stored as f64 like
    /// everything else and converted at the point of use.
    pub fn get_usize(&self, name: &str) -> Result<usize, FxgridError> {
        Ok(self.get(name)?.round() as usize)
    }
}

#[derive(Debug, Clone)]
pub struct ParameterGrid {
    axes: Vec<(String, Vec<f64>)>,
    fixed: Vec<(String, f64)>,
}

impl ParameterGrid {
    pub fn new() -> Self {
        ParameterGrid {
            axes: Vec::new(),
            fixed: Vec::new(),
        }
    }

    pub fn axis(mut self, name: &str, values: &[f64]) -> Self {
        self.axes.push((name.to_string(), values.to_vec()));
        self
    }

    pub fn fixed(mut self, name: &str, value: f64) -> Self {
        self.fixed.push((name.to_string(), value));
        self
    }

    /// Replace the values of an existing axis; appends a new axis when the
    /// name is unknown.
    pub fn override_axis(mut self, name: &str, values: &[f64]) -> Self {
        if let Some(axis) = self.axes.iter_mut().find(|(n, _)| n == name) {
            axis.1 = values.to_vec();
            self
        } else {
            self.axis(name, values)
        }
    }

    pub fn combination_count(&self) -> usize {
        self.axes.iter().map(|(_, v)| v.len()).product()
    }

    /// Materialize every combination in deterministic order. Fails with
    /// [`FxgridError::GridTooLarge`] when the product exceeds the cap.
    pub fn enumerate(&self, pair: &str) -> Result<Vec<ParameterCombination>, FxgridError> {
        let count = self.combination_count();
        if count > MAX_COMBINATIONS {
            return Err(FxgridError::GridTooLarge {
                pair: pair.to_string(),
                combinations: count,
                cap: MAX_COMBINATIONS,
            });
        }

        let mut combos = Vec::with_capacity(count);
        let mut current = ParameterCombination::empty();
        for (name, value) in &self.fixed {
            current.insert(name, *value);
        }
        self.expand(0, &mut current, &mut combos);
        Ok(combos)
    }

    fn expand(
        &self,
        axis_index: usize,
        current: &mut ParameterCombination,
        out: &mut Vec<ParameterCombination>,
    ) {
        match self.axes.get(axis_index) {
            None => out.push(current.clone()),
            Some((name, values)) => {
                for &value in values {
                    current.insert(name, value);
                    self.expand(axis_index + 1, current, out);
                }
            }
        }
    }

    /// The stock search grid: Bollinger and regime axes with the EMA pair
    /// held fixed. JPY crosses get tighter band-width candidates.
    pub fn default_for_pair(pair: &str) -> Self {
        let grid = ParameterGrid::new()
            .axis("bb_period", &[15.0, 20.0, 25.0])
            .axis("bb_std_dev", &[1.8, 2.0, 2.2])
            .axis("atr_period", &[14.0])
            .axis("bb_width_threshold", &[0.0015, 0.002, 0.0025])
            .axis("min_bb_width", &[0.0005, 0.0008, 0.0012])
            .axis("atr_ratio_threshold", &[0.8, 0.9, 1.0])
            .fixed("ema_fast", 8.0)
            .fixed("ema_slow", 21.0);

        match pair {
            "GBP_JPY" => grid
                .override_axis("bb_std_dev", &[2.0, 2.5, 3.0])
                .override_axis("min_bb_width", &[0.0004, 0.0006, 0.0009]),
            "USD_JPY" => grid.override_axis("min_bb_width", &[0.0004, 0.0006, 0.0009]),
            _ => grid,
        }
    }
}

impl Default for ParameterGrid {
    fn default() -> Self {
        ParameterGrid::new()
    }
}
