//! Process-local watchlist store; nothing survives a restart.

use std::sync::Mutex;

use crate::domain::error::ScreenerError;
use crate::domain::watchlist::Watchlist;
use crate::ports::watchlist_port::WatchlistStore;

#[derive(Default)]
pub struct MemoryWatchlistStore {
    saved: Mutex<Option<Watchlist>>,
}

impl MemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatchlistStore for MemoryWatchlistStore {
    fn load(&self) -> Result<Option<Watchlist>, ScreenerError> {
        let saved = self
            .saved
            .lock()
            .map_err(|_| ScreenerError::storage("watchlist lock poisoned"))?;
        Ok(saved.clone())
    }

    fn save(&self, watchlist: &Watchlist) -> Result<(), ScreenerError> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| ScreenerError::storage("watchlist lock poisoned"))?;
        *saved = Some(watchlist.clone());
        Ok(())
    }
}
