//! Domain error types.

/// Top-level error type for fxgrid.
///
/// Variants fall into four families: validation (a single bad signal, the
/// caller skips it), configuration (fatal before any simulation runs), data
/// (fatal to one instrument's run), and I/O.
#[derive(Debug, thiserror::Error)]
pub enum FxgridError {
    #[error("invalid stop-loss {stop_loss} for {direction} entry at {entry_price}")]
    InvalidStop {
        direction: &'static str,
        entry_price: f64,
        stop_loss: f64,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("grid for {pair} has {combinations} combinations, exceeding cap of {cap}")]
    GridTooLarge {
        pair: String,
        combinations: usize,
        cap: usize,
    },

    #[error("missing parameter axis {name}")]
    MissingAxis { name: String },

    #[error("no bars for {pair} ({timeframe})")]
    NoData { pair: String, timeframe: String },

    #[error("bars for {pair} are not sorted by time at index {index}")]
    UnsortedData { pair: String, index: usize },

    #[error("signal bar at index {index} for {pair} is missing {field}")]
    MissingSignalFields {
        pair: String,
        index: usize,
        field: &'static str,
    },

    #[error("malformed data in {path}: {reason}")]
    MalformedData { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<&FxgridError> for std::process::ExitCode {
    fn from(err: &FxgridError) -> Self {
        let code: u8 = match err {
            FxgridError::Io(_) => 1,
            FxgridError::ConfigParse { .. }
            | FxgridError::ConfigMissing { .. }
            | FxgridError::ConfigInvalid { .. }
            | FxgridError::GridTooLarge { .. }
            | FxgridError::MissingAxis { .. } => 2,
            FxgridError::InvalidStop { .. } => 4,
            FxgridError::NoData { .. }
            | FxgridError::UnsortedData { .. }
            | FxgridError::MissingSignalFields { .. }
            | FxgridError::MalformedData { .. }
            | FxgridError::Csv(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_stop() {
        let err = FxgridError::InvalidStop {
            direction: "long",
            entry_price: 1.1,
            stop_loss: 1.2,
        };
        let msg = err.to_string();
        assert!(msg.contains("long"));
        assert!(msg.contains("1.2"));
    }

    #[test]
    fn display_grid_too_large() {
        let err = FxgridError::GridTooLarge {
            pair: "EUR_USD".into(),
            combinations: 729,
            cap: 500,
        };
        assert!(err.to_string().contains("729"));
        assert!(err.to_string().contains("500"));
    }
}
