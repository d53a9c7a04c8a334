//! Watchlist persisted as a two-column CSV file (`ticker,added`).

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::ScreenerError;
use crate::domain::ticker::Ticker;
use crate::domain::watchlist::{Watchlist, WatchlistEntry};
use crate::ports::watchlist_port::WatchlistStore;

pub struct CsvWatchlistStore {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    ticker: String,
    added: NaiveDate,
}

impl CsvWatchlistStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl WatchlistStore for CsvWatchlistStore {
    fn load(&self) -> Result<Option<Watchlist>, ScreenerError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| {
                ScreenerError::storage(format!("failed to open {}: {}", self.path.display(), e))
            })?;

        let mut entries = Vec::new();
        for result in rdr.deserialize::<Row>() {
            let row = result.map_err(|e| {
                ScreenerError::storage(format!("bad row in {}: {}", self.path.display(), e))
            })?;
            entries.push(WatchlistEntry {
                ticker: Ticker::parse(&row.ticker)?,
                added: row.added,
            });
        }
        Ok(Some(Watchlist::from_entries(entries)))
    }

    fn save(&self, watchlist: &Watchlist) -> Result<(), ScreenerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut wtr = csv::Writer::from_writer(Vec::new());
        for entry in watchlist.list() {
            wtr.serialize(Row {
                ticker: entry.ticker.to_string(),
                added: entry.added,
            })
            .map_err(|e| ScreenerError::storage(e.to_string()))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| ScreenerError::storage(e.to_string()))?;

        // Write-then-rename so a crash never leaves a half-written list.
        let tmp = self.path.with_extension("csv.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), entries = watchlist.len(), "watchlist saved");
        Ok(())
    }
}
