//! Domain error types.

/// Top-level error type for qvmscreen.
///
/// Every variant is user-facing: the CLI prints it and maps it to an exit
/// code, the web adapter renders it as an error card. None of them are fatal
/// to a running server.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("invalid ticker {input:?}: {reason}")]
    InvalidTicker { input: String, reason: String },

    #[error("data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("insufficient history for {ticker}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        ticker: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid price series: {reason}")]
    InvalidPriceSeries { reason: String },

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

    #[error("watchlist storage error: {reason}")]
    Storage { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenerError {
    pub fn unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage {
            reason: reason.into(),
        }
    }
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::Storage { .. } => 3,
            ScreenerError::InvalidTicker { .. } => 4,
            ScreenerError::DataUnavailable { .. }
            | ScreenerError::InsufficientHistory { .. }
            | ScreenerError::InvalidPriceSeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_unavailable_message_names_ticker() {
        let err = ScreenerError::unavailable("AAPL", "request timeout");
        assert_eq!(err.to_string(), "data unavailable for AAPL: request timeout");
    }

    #[test]
    fn insufficient_history_message() {
        let err = ScreenerError::InsufficientHistory {
            ticker: "MSFT".into(),
            bars: 12,
            minimum: 50,
        };
        assert_eq!(
            err.to_string(),
            "insufficient history for MSFT: have 12 bars, need 50"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ScreenerError = io.into();
        assert!(matches!(err, ScreenerError::Io(_)));
    }
}
