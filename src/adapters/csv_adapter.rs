//! Offline market data from CSV files.
//!
//! Prices come from `<dir>/<TICKER>.csv` (`date,open,high,low,close,volume`)
//! and fundamentals from a shared `<dir>/fundamentals.csv` keyed by ticker.

use crate::domain::error::ScreenerError;
use crate::domain::fundamentals::{FundamentalSnapshot, MarketData};
use crate::domain::price::{PriceBar, PriceSeries};
use crate::domain::ticker::Ticker;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::{FetchFuture, MarketDataPort};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const FUNDAMENTALS_FILE: &str = "fundamentals.csv";

pub struct CsvMarketDataAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

#[derive(Debug, Deserialize)]
struct FundamentalsRow {
    ticker: String,
    pe_ratio: Option<f64>,
    pb_ratio: Option<f64>,
    dividend_yield: Option<f64>,
    roe: Option<f64>,
    operating_margin: Option<f64>,
    revenue_growth: Option<f64>,
    #[serde(default)]
    name: Option<String>,
}

impl CsvMarketDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        let dir = config
            .get_non_empty("csv", "dir")
            .ok_or_else(|| ScreenerError::ConfigMissing {
                section: "csv".into(),
                key: "dir".into(),
            })?;
        Ok(Self::new(PathBuf::from(dir)))
    }

    fn csv_path(&self, ticker: &Ticker) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    pub fn load_prices(&self, ticker: &Ticker) -> Result<PriceSeries, ScreenerError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| {
            ScreenerError::unavailable(
                ticker.as_str(),
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.deserialize::<PriceRow>() {
            let row = result.map_err(|e| {
                ScreenerError::unavailable(ticker.as_str(), format!("CSV parse error: {}", e))
            })?;
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
                ScreenerError::unavailable(
                    ticker.as_str(),
                    format!("invalid date {:?}: {}", row.date, e),
                )
            })?;
            bars.push(PriceBar {
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        PriceSeries::from_unsorted(bars)
    }

    /// Missing file or missing row yields an empty snapshot.
    pub fn load_fundamentals(&self, ticker: &Ticker) -> Result<FundamentalSnapshot, ScreenerError> {
        let path = self.base_path.join(FUNDAMENTALS_FILE);
        if !path.exists() {
            return Ok(FundamentalSnapshot::default());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| {
                ScreenerError::unavailable(
                    ticker.as_str(),
                    format!("failed to read {}: {}", path.display(), e),
                )
            })?;

        for result in rdr.deserialize::<FundamentalsRow>() {
            let row = result.map_err(|e| {
                ScreenerError::unavailable(ticker.as_str(), format!("CSV parse error: {}", e))
            })?;
            if row.ticker.eq_ignore_ascii_case(ticker.as_str()) {
                let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
                return Ok(FundamentalSnapshot {
                    pe_ratio: finite(row.pe_ratio),
                    pb_ratio: finite(row.pb_ratio),
                    dividend_yield: finite(row.dividend_yield),
                    roe: finite(row.roe),
                    operating_margin: finite(row.operating_margin),
                    revenue_growth: finite(row.revenue_growth),
                    name: row.name.filter(|n| !n.is_empty()),
                    ..Default::default()
                });
            }
        }
        Ok(FundamentalSnapshot::default())
    }
}

impl MarketDataPort for CsvMarketDataAdapter {
    fn fetch<'a>(&'a self, ticker: &'a Ticker) -> FetchFuture<'a> {
        Box::pin(async move {
            let prices = self.load_prices(ticker)?;
            let fundamentals = self.load_fundamentals(ticker)?;
            tracing::debug!(ticker = %ticker, bars = prices.len(), "loaded csv market data");
            Ok(MarketData {
                ticker: ticker.clone(),
                fundamentals,
                prices,
            })
        })
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}
