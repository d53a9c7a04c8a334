//! SQLite watchlist store.

use crate::domain::error::ScreenerError;
use crate::domain::ticker::Ticker;
use crate::domain::watchlist::{Watchlist, WatchlistEntry};
use crate::ports::config_port::ConfigPort;
use crate::ports::watchlist_port::WatchlistStore;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteWatchlistStore {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> ScreenerError {
    ScreenerError::storage(e.to_string())
}

fn query_error(e: rusqlite::Error) -> ScreenerError {
    ScreenerError::storage(e.to_string())
}

impl SqliteWatchlistStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        let db_path =
            config
                .get_non_empty("watchlist", "path")
                .ok_or_else(|| ScreenerError::ConfigMissing {
                    section: "watchlist".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("watchlist", "pool_size", 4).max(1) as u32;
        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, ScreenerError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, ScreenerError> {
        self.pool.get().map_err(pool_error)
    }

    /// `meta` records whether the list has ever been saved, so an emptied
    /// watchlist is not mistaken for a fresh database.
    pub fn initialize_schema(&self) -> Result<(), ScreenerError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS watchlist (
                    ticker TEXT PRIMARY KEY NOT NULL,
                    added TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS watchlist_meta (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL
                );",
            )
            .map_err(query_error)
    }
}

impl WatchlistStore for SqliteWatchlistStore {
    fn load(&self) -> Result<Option<Watchlist>, ScreenerError> {
        let conn = self.conn()?;

        let initialised: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM watchlist_meta WHERE key = 'saved'",
                [],
                |row| row.get(0),
            )
            .map_err(query_error)?;
        if initialised == 0 {
            return Ok(None);
        }

        let mut stmt = conn
            .prepare("SELECT ticker, added FROM watchlist ORDER BY ticker ASC")
            .map_err(query_error)?;
        let rows = stmt
            .query_map([], |row| {
                let ticker: String = row.get(0)?;
                let date_str: String = row.get(1)?;
                let added = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        date_str.len(),
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok((ticker, added))
            })
            .map_err(query_error)?;

        let mut entries = Vec::new();
        for row in rows {
            let (ticker, added) = row.map_err(query_error)?;
            entries.push(WatchlistEntry {
                ticker: Ticker::parse(&ticker)?,
                added,
            });
        }
        Ok(Some(Watchlist::from_entries(entries)))
    }

    fn save(&self, watchlist: &Watchlist) -> Result<(), ScreenerError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        tx.execute("DELETE FROM watchlist", []).map_err(query_error)?;
        for entry in watchlist.list() {
            tx.execute(
                "INSERT INTO watchlist (ticker, added) VALUES (?1, ?2)",
                params![
                    entry.ticker.as_str(),
                    entry.added.format("%Y-%m-%d").to_string()
                ],
            )
            .map_err(query_error)?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO watchlist_meta (key, value) VALUES ('saved', '1')",
            [],
        )
        .map_err(query_error)?;

        tx.commit().map_err(query_error)?;
        Ok(())
    }
}
