//! The user's watchlist: a set of tickers with the date each was added.
//!
//! The watchlist is a plain owned value. Whoever holds it (the CLI command or
//! the web `AppState`) loads it from a [`WatchlistStore`] at startup and saves
//! it back after every mutation that changed the set.
//!
//! [`WatchlistStore`]: crate::ports::watchlist_port::WatchlistStore

use crate::domain::error::ScreenerError;
use crate::domain::ticker::Ticker;
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const DEFAULT_WATCHLIST: &[&str] = &[
    "AAPL", "MSFT", "TSLA", "AMZN", "GOOG", "META", "NVDA", "SLB", "XOM", "UBER", "AMD", "ORCL",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    pub ticker: Ticker,
    pub added: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watchlist {
    entries: BTreeMap<Ticker, WatchlistEntry>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock list used when nothing has been persisted yet.
    pub fn with_defaults(added: NaiveDate) -> Result<Self, ScreenerError> {
        let mut list = Self::new();
        for symbol in DEFAULT_WATCHLIST {
            list.add(Ticker::parse(symbol)?, added);
        }
        Ok(list)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = WatchlistEntry>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            list.entries.entry(entry.ticker.clone()).or_insert(entry);
        }
        list
    }

    /// Returns `false` (and keeps the original date) when already present.
    pub fn add(&mut self, ticker: Ticker, added: NaiveDate) -> bool {
        if self.entries.contains_key(&ticker) {
            return false;
        }
        self.entries
            .insert(ticker.clone(), WatchlistEntry { ticker, added });
        true
    }

    /// Returns `false` when the ticker was not on the list.
    pub fn remove(&mut self, ticker: &Ticker) -> bool {
        self.entries.remove(ticker).is_some()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.entries.contains_key(ticker)
    }

    /// Each ticker exactly once, sorted by symbol.
    pub fn list(&self) -> Vec<&WatchlistEntry> {
        self.entries.values().collect()
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
