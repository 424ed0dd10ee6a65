#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use fxgrid::domain::bar::Bar;
use fxgrid::domain::error::FxgridError;
use fxgrid::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, pair: &str, timeframe: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(format!("{pair}_{timeframe}"), bars);
        self
    }

    pub fn with_error(mut self, pair: &str, timeframe: &str, reason: &str) -> Self {
        self.errors
            .insert(format!("{pair}_{timeframe}"), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, pair: &str, timeframe: &str) -> Result<Vec<Bar>, FxgridError> {
        let key = format!("{pair}_{timeframe}");
        if let Some(reason) = self.errors.get(&key) {
            return Err(FxgridError::MalformedData {
                path: key,
                reason: reason.clone(),
            });
        }
        match self.data.get(&key) {
            Some(bars) if !bars.is_empty() => Ok(bars.clone()),
            _ => Err(FxgridError::NoData {
                pair: pair.to_string(),
                timeframe: timeframe.to_string(),
            }),
        }
    }
}

/// 08:00 UTC on a Wednesday: inside the London session.
pub fn session_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 10)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

pub fn make_bar(time: NaiveDateTime, close: f64, range: f64) -> Bar {
    Bar {
        time,
        open: close,
        high: close + range,
        low: close - range,
        close,
        volume: 1000,
    }
}

/// M15 bars oscillating around a base price, starting in the London
/// session. The oscillation keeps Bollinger bands open without trending.
pub fn oscillating_m15(n: usize, base: f64, amplitude: f64) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = base + amplitude * ((i as f64) * 0.9).sin();
            make_bar(
                session_start() + chrono::Duration::minutes(15 * i as i64),
                close,
                amplitude * 0.3,
            )
        })
        .collect()
}

pub fn oscillating_h1(n: usize, base: f64, amplitude: f64) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = base + amplitude * ((i as f64) * 0.7).sin();
            make_bar(
                session_start() + chrono::Duration::hours(i as i64),
                close,
                amplitude * 0.4,
            )
        })
        .collect()
}
