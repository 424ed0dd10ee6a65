//! CSV candle data adapter.
//!
//! Files are named `{PAIR}_{TIMEFRAME}.csv` (e.g. `EUR_USD_M15.csv`) with
//! columns `time,open,high,low,close,volume` and timestamps formatted as
//! `%Y-%m-%d %H:%M:%S` in UTC. Rows are sorted by time after parsing, so a
//! file written out of order still loads.

use crate::domain::bar::Bar;
use crate::domain::error::FxgridError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::path::PathBuf;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, pair: &str, timeframe: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", pair, timeframe))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, pair: &str, timeframe: &str) -> Result<Vec<Bar>, FxgridError> {
        let path = self.csv_path(pair, timeframe);
        let display = path.display().to_string();

        let mut rdr = csv::Reader::from_path(&path)?;
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| FxgridError::MalformedData {
                path: display.clone(),
                reason: format!("row {}: {}", row + 1, e),
            })?;

            let field = |idx: usize, name: &str| -> Result<&str, FxgridError> {
                record.get(idx).ok_or_else(|| FxgridError::MalformedData {
                    path: display.clone(),
                    reason: format!("row {}: missing {} column", row + 1, name),
                })
            };

            let time = NaiveDateTime::parse_from_str(field(0, "time")?, TIME_FORMAT).map_err(
                |e| FxgridError::MalformedData {
                    path: display.clone(),
                    reason: format!("row {}: invalid time: {}", row + 1, e),
                },
            )?;

            let parse_f64 = |idx: usize, name: &str| -> Result<f64, FxgridError> {
                field(idx, name)?
                    .parse()
                    .map_err(|e| FxgridError::MalformedData {
                        path: display.clone(),
                        reason: format!("row {}: invalid {} value: {}", row + 1, name, e),
                    })
            };

            let volume: i64 =
                field(5, "volume")?
                    .parse()
                    .map_err(|e| FxgridError::MalformedData {
                        path: display.clone(),
                        reason: format!("row {}: invalid volume value: {}", row + 1, e),
                    })?;

            bars.push(Bar {
                time,
                open: parse_f64(1, "open")?,
                high: parse_f64(2, "high")?,
                low: parse_f64(3, "low")?,
                close: parse_f64(4, "close")?,
                volume,
            });
        }

        if bars.is_empty() {
            return Err(FxgridError::NoData {
                pair: pair.to_string(),
                timeframe: timeframe.to_string(),
            });
        }

        bars.sort_by_key(|b| b.time);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let content = "time,open,high,low,close,volume\n\
            2024-04-10 08:15:00,1.1005,1.1010,1.1000,1.1008,1200\n\
            2024-04-10 08:00:00,1.1000,1.1006,1.0998,1.1005,1000\n\
            2024-04-10 08:30:00,1.1008,1.1015,1.1005,1.1012,1400\n";
        fs::write(path.join("EUR_USD_M15.csv"), content).unwrap();

        fs::write(
            path.join("GBP_USD_M15.csv"),
            "time,open,high,low,close,volume\n",
        )
        .unwrap();

        fs::write(
            path.join("USD_JPY_M15.csv"),
            "time,open,high,low,close,volume\n2024-04-10 08:00:00,abc,150,149,150,100\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_parses_and_sorts() {
        let (_dir, path) = setup();
        let adapter = CsvAdapter::new(path);
        let bars = adapter.fetch_bars("EUR_USD", "M15").unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(
            bars[0].time,
            NaiveDate::from_ymd_opt(2024, 4, 10)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );
        assert_eq!(bars[0].open, 1.1000);
        assert_eq!(bars[2].close, 1.1012);
        assert!(bars.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn empty_file_is_no_data() {
        let (_dir, path) = setup();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_bars("GBP_USD", "M15");
        assert!(matches!(result, Err(FxgridError::NoData { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let (_dir, path) = setup();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_bars("AUD_USD", "M15");
        assert!(result.is_err());
    }

    #[test]
    fn bad_value_is_malformed_data() {
        let (_dir, path) = setup();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_bars("USD_JPY", "M15");
        assert!(matches!(result, Err(FxgridError::MalformedData { .. })));
    }
}
