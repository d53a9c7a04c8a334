//! Concrete adapter implementations for ports.

pub mod alphavantage_adapter;
pub mod chart_svg;
pub mod csv_adapter;
pub mod csv_watchlist_store;
pub mod file_config_adapter;
#[cfg(feature = "web")]
pub mod html_report_adapter;
pub mod memory_watchlist_store;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
#[cfg(feature = "web")]
pub mod web;

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::config_validation::{provider_kind, store_kind};
use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::watchlist_port::WatchlistStore;

use alphavantage_adapter::AlphaVantageAdapter;
use csv_adapter::CsvMarketDataAdapter;
use csv_watchlist_store::CsvWatchlistStore;
use memory_watchlist_store::MemoryWatchlistStore;

/// Build the market data provider named by `[provider] kind`.
pub fn market_data_from_config(
    config: &dyn ConfigPort,
) -> Result<Arc<dyn MarketDataPort>, ScreenerError> {
    match provider_kind(config).as_str() {
        "alphavantage" => Ok(Arc::new(AlphaVantageAdapter::from_config(config)?)),
        "csv" => Ok(Arc::new(CsvMarketDataAdapter::from_config(config)?)),
        other => Err(ScreenerError::ConfigInvalid {
            section: "provider".into(),
            key: "kind".into(),
            reason: format!("unknown provider {:?}", other),
        }),
    }
}

/// Build the watchlist store named by `[watchlist] store`.
pub fn watchlist_store_from_config(
    config: &dyn ConfigPort,
) -> Result<Arc<dyn WatchlistStore>, ScreenerError> {
    match store_kind(config).as_str() {
        "memory" => Ok(Arc::new(MemoryWatchlistStore::new())),
        "csv" => {
            let path = config.get_non_empty("watchlist", "path").ok_or_else(|| {
                ScreenerError::ConfigMissing {
                    section: "watchlist".into(),
                    key: "path".into(),
                }
            })?;
            Ok(Arc::new(CsvWatchlistStore::new(PathBuf::from(path))))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(sqlite_adapter::SqliteWatchlistStore::from_config(
            config,
        )?)),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(ScreenerError::ConfigInvalid {
            section: "watchlist".into(),
            key: "store".into(),
            reason: "built without the sqlite feature".into(),
        }),
        other => Err(ScreenerError::ConfigInvalid {
            section: "watchlist".into(),
            key: "store".into(),
            reason: format!("unknown store {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn csv_provider_is_built() {
        let c = config("[provider]\nkind = csv\n[csv]\ndir = data\n");
        assert_eq!(market_data_from_config(&c).unwrap().name(), "csv");
    }

    #[test]
    fn alphavantage_provider_is_built() {
        let c = config("[provider]\nkind = alphavantage\napi_key = demo\n");
        assert_eq!(market_data_from_config(&c).unwrap().name(), "alphavantage");
    }

    #[test]
    fn unknown_store_rejected() {
        let c = config("[watchlist]\nstore = redis\n");
        assert!(matches!(
            watchlist_store_from_config(&c),
            Err(ScreenerError::ConfigInvalid { key, .. }) if key == "store"
        ));
    }

    #[test]
    fn memory_store_starts_empty() {
        let store = watchlist_store_from_config(&config("")).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn csv_store_needs_path() {
        let c = config("[watchlist]\nstore = csv\n");
        assert!(matches!(
            watchlist_store_from_config(&c),
            Err(ScreenerError::ConfigMissing { .. })
        ));
    }
}
