//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Look up a value and parse it, falling back to `default` when the key
    /// is absent or does not parse. Unparseable values are treated the same
    /// as missing ones rather than erroring; required keys are enforced by
    /// the builders in the CLI layer.
    fn parsed<T: std::str::FromStr>(&self, section: &str, key: &str, default: T) -> T {
        self.config
            .get(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parsed(section, key, default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parsed(section, key, default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self
            .config
            .get(section, key)
            .map(|v| v.trim().to_lowercase())
            .as_deref()
        {
            Some("true" | "yes" | "1") => true,
            Some("false" | "no" | "0") => false,
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn from_string_parses_sections() {
        let content = r#"
[backtest]
initial_balance = 10000.0
risk_pct = 0.01

[optimizer]
data_split = 0.7

[pairs]
list = EUR_USD,GBP_USD
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_double("backtest", "initial_balance", 0.0),
            10_000.0
        );
        assert_eq!(adapter.get_double("optimizer", "data_split", 0.0), 0.7);
        assert_eq!(
            adapter.get_string("pairs", "list"),
            Some("EUR_USD,GBP_USD".to_string())
        );
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_int("backtest", "missing", 42), 42);
        assert_eq!(adapter.get_double("backtest", "missing", 9.5), 9.5);
        assert!(adapter.get_bool("backtest", "missing", true));
    }

    #[test]
    fn non_numeric_values_fall_back_to_defaults() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_balance = plenty\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_balance", 1.0), 1.0);
        assert_eq!(adapter.get_int("backtest", "initial_balance", 7), 7);
    }

    #[test]
    fn bool_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[flags]\na = yes\nb = 0\nc = True\nd = off\n")
                .unwrap();
        assert!(adapter.get_bool("flags", "a", false));
        assert!(!adapter.get_bool("flags", "b", true));
        assert!(adapter.get_bool("flags", "c", false));
        // Unknown spelling keeps the default.
        assert!(adapter.get_bool("flags", "d", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[data]\npath = /var/data/candles\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("/var/data/candles".to_string())
        );
    }

    #[test]
    fn from_file_errors_on_missing_file() {
        assert!(FileConfigAdapter::from_file("/nonexistent/fxgrid.ini").is_err());
    }
}
