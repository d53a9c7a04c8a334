//! Ticker symbols and ticker-list parsing.
//!
//! A [`Ticker`] only checks shape: the data provider remains the source of
//! truth for whether a symbol actually trades.

use crate::domain::error::ScreenerError;
use std::collections::HashSet;
use std::fmt;

pub const MAX_TICKER_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticker(String);

impl Ticker {
    /// Trim, uppercase and validate a user-supplied symbol.
    pub fn parse(input: &str) -> Result<Self, ScreenerError> {
        let symbol = input.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(invalid(input, "ticker is empty"));
        }
        if symbol.len() > MAX_TICKER_LEN {
            return Err(invalid(
                input,
                &format!("ticker longer than {} characters", MAX_TICKER_LEN),
            ));
        }
        if let Some(c) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(invalid(input, &format!("unexpected character {:?}", c)));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn invalid(input: &str, reason: &str) -> ScreenerError {
    ScreenerError::InvalidTicker {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a comma or whitespace separated list, dropping duplicates while
/// keeping first-seen order.
pub fn parse_tickers(input: &str) -> Result<Vec<Ticker>, ScreenerError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.trim().is_empty() {
            continue;
        }
        let ticker = Ticker::parse(token)?;
        if seen.insert(ticker.clone()) {
            tickers.push(ticker);
        }
    }

    if tickers.is_empty() {
        return Err(invalid(input, "no tickers given"));
    }
    Ok(tickers)
}
