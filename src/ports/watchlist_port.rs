//! Watchlist persistence port.

use crate::domain::error::ScreenerError;
use crate::domain::watchlist::Watchlist;

pub trait WatchlistStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Watchlist>, ScreenerError>;

    fn save(&self, watchlist: &Watchlist) -> Result<(), ScreenerError>;
}
