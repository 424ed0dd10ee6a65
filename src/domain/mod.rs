//! Core domain types and logic.

pub mod bar;
pub mod instrument;
pub mod trade;
pub mod sizing;
pub mod metrics;
pub mod backtest;
pub mod indicator;
pub mod session;
pub mod regime;
pub mod signal;
pub mod params;
pub mod grid;
pub mod optimize;
pub mod mode;
pub mod error;
