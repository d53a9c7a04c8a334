#![allow(dead_code)]

use chrono::NaiveDate;
use qvmscreen::domain::error::ScreenerError;
use qvmscreen::domain::fundamentals::{FundamentalSnapshot, MarketData};
use qvmscreen::domain::price::{PriceBar, PriceSeries};
use qvmscreen::domain::ticker::Ticker;
use qvmscreen::ports::market_data_port::{FetchFuture, MarketDataPort};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockMarketData {
    pub data: HashMap<String, MarketData>,
    pub errors: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_data(
        mut self,
        ticker: &str,
        fundamentals: FundamentalSnapshot,
        prices: PriceSeries,
    ) -> Self {
        let ticker = Ticker::parse(ticker).unwrap();
        self.data.insert(
            ticker.as_str().to_string(),
            MarketData {
                ticker,
                fundamentals,
                prices,
            },
        );
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch<'a>(&'a self, ticker: &'a Ticker) -> FetchFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(reason) = self.errors.get(ticker.as_str()) {
                return Err(ScreenerError::unavailable(ticker.as_str(), reason.clone()));
            }
            self.data
                .get(ticker.as_str())
                .cloned()
                .ok_or_else(|| ScreenerError::unavailable(ticker.as_str(), "unknown symbol"))
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub fn series_from_closes(start: &str, closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000_000,
        })
        .collect();
    PriceSeries::new(bars).unwrap()
}

/// 150 sessions flat at 100, then 100 sessions rising by 1 to close at 200.
pub fn flat_then_rising() -> PriceSeries {
    let closes: Vec<f64> = (0..250)
        .map(|i| if i < 150 { 100.0 } else { 100.0 + (i - 149) as f64 })
        .collect();
    series_from_closes("2023-01-02", &closes)
}

/// P/E 15, P/B 2, yield 2%, ROE 18%, margin 12%, growth 8%.
pub fn reference_fundamentals() -> FundamentalSnapshot {
    FundamentalSnapshot {
        pe_ratio: Some(15.0),
        pb_ratio: Some(2.0),
        dividend_yield: Some(2.0),
        roe: Some(18.0),
        operating_margin: Some(12.0),
        revenue_growth: Some(8.0),
        name: Some("Reference Corp".to_string()),
        ..Default::default()
    }
}
