//! Alpha Vantage market data adapter.
//!
//! One fetch issues two requests: `OVERVIEW` for fundamentals and
//! `TIME_SERIES_DAILY` for price history. Alpha Vantage reports most
//! failures as HTTP 200 with an `"Error Message"`, `"Note"` or
//! `"Information"` field, so every body is checked for those before parsing.
//! Numbers arrive as strings, with `"None"` or `"-"` standing in for missing
//! values.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::config_validation::API_KEY_ENV;
use crate::domain::error::ScreenerError;
use crate::domain::fundamentals::{fraction_to_percent, FundamentalSnapshot, MarketData};
use crate::domain::price::{PriceBar, PriceSeries};
use crate::domain::ticker::Ticker;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::{FetchFuture, MarketDataPort};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const PROVIDER_ERROR_KEYS: &[&str] = &["Error Message", "Note", "Information"];
const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySize {
    /// Latest 100 sessions.
    Compact,
    /// Up to 20 years of sessions.
    Full,
}

impl HistorySize {
    fn as_param(&self) -> &'static str {
        match self {
            HistorySize::Compact => "compact",
            HistorySize::Full => "full",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlphaVantageSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub history: HistorySize,
}

impl AlphaVantageSettings {
    /// Read `[provider]`, falling back to the `ALPHAVANTAGE_API_KEY`
    /// environment variable for the key.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        let api_key = config
            .get_non_empty("provider", "api_key")
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
            .ok_or_else(|| ScreenerError::ConfigMissing {
                section: "provider".into(),
                key: "api_key".into(),
            })?;

        let history = match config
            .get_non_empty("provider", "history")
            .map(|h| h.to_lowercase())
            .as_deref()
        {
            None | Some("full") => HistorySize::Full,
            Some("compact") => HistorySize::Compact,
            Some(other) => {
                return Err(ScreenerError::ConfigInvalid {
                    section: "provider".into(),
                    key: "history".into(),
                    reason: format!("expected compact or full, got {:?}", other),
                });
            }
        };

        let timeout_secs = config.get_int("provider", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64);

        Ok(Self {
            api_key,
            base_url: config
                .get_non_empty("provider", "base_url")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs.max(1) as u64),
            history,
        })
    }
}

pub struct AlphaVantageAdapter {
    client: reqwest::Client,
    settings: AlphaVantageSettings,
}

impl AlphaVantageAdapter {
    pub fn new(settings: AlphaVantageSettings) -> Result<Self, ScreenerError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ScreenerError::ConfigInvalid {
                section: "provider".into(),
                key: "timeout_secs".into(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, settings })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        Self::new(AlphaVantageSettings::from_config(config)?)
    }

    async fn query(&self, ticker: &Ticker, params: &[(&str, &str)]) -> Result<Value, ScreenerError> {
        let url = format!("{}/query", self.settings.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("symbol", ticker.as_str()), ("apikey", self.settings.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "provider request timed out".to_string()
                } else {
                    format!("provider request failed: {e}")
                };
                ScreenerError::unavailable(ticker.as_str(), reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScreenerError::unavailable(
                ticker.as_str(),
                format!("provider returned status {status}"),
            ));
        }

        let body: Value = response.json().await.map_err(|e| {
            ScreenerError::unavailable(ticker.as_str(), format!("malformed provider response: {e}"))
        })?;
        check_provider_error(ticker, &body)?;
        Ok(body)
    }

    async fn fetch_market_data(&self, ticker: &Ticker) -> Result<MarketData, ScreenerError> {
        tracing::debug!(ticker = %ticker, "fetching from alphavantage");

        let overview = self.query(ticker, &[("function", "OVERVIEW")]).await?;
        let fundamentals = parse_overview(&overview);
        if fundamentals.scored_field_count() == 0 {
            tracing::warn!(ticker = %ticker, "alphavantage overview has no scored fields");
        }

        let daily = self
            .query(
                ticker,
                &[
                    ("function", "TIME_SERIES_DAILY"),
                    ("outputsize", self.settings.history.as_param()),
                ],
            )
            .await?;
        let prices = parse_daily_series(ticker, &daily)?;

        Ok(MarketData {
            ticker: ticker.clone(),
            fundamentals,
            prices,
        })
    }
}

impl MarketDataPort for AlphaVantageAdapter {
    fn fetch<'a>(&'a self, ticker: &'a Ticker) -> FetchFuture<'a> {
        Box::pin(self.fetch_market_data(ticker))
    }

    fn name(&self) -> &'static str {
        "alphavantage"
    }
}

fn check_provider_error(ticker: &Ticker, body: &Value) -> Result<(), ScreenerError> {
    for key in PROVIDER_ERROR_KEYS {
        if let Some(message) = body.get(*key).and_then(Value::as_str) {
            return Err(ScreenerError::unavailable(
                ticker.as_str(),
                format!("provider said: {message}"),
            ));
        }
    }
    Ok(())
}

/// Provider numeric string to `f64`. `"None"`, `"-"`, empty and non-finite
/// values are missing.
fn provider_number(body: &Value, key: &str) -> Option<f64> {
    let raw = body.get(key)?;
    let parsed = match raw {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "None" || s == "-" {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

/// Alpha Vantage reports a zero yield as `"0"` for companies that simply
/// have no data. Treat that the same as missing.
fn provider_yield(body: &Value) -> Option<f64> {
    provider_number(body, "DividendYield").filter(|y| *y != 0.0)
}

pub fn parse_overview(body: &Value) -> FundamentalSnapshot {
    FundamentalSnapshot {
        pe_ratio: provider_number(body, "PERatio"),
        pb_ratio: provider_number(body, "PriceToBookRatio"),
        dividend_yield: fraction_to_percent(provider_yield(body)),
        roe: fraction_to_percent(provider_number(body, "ReturnOnEquityTTM")),
        operating_margin: fraction_to_percent(provider_number(body, "OperatingMarginTTM")),
        revenue_growth: fraction_to_percent(provider_number(body, "QuarterlyRevenueGrowthYOY")),
        ps_ratio: provider_number(body, "PriceToSalesRatioTTM"),
        market_cap: provider_number(body, "MarketCapitalization"),
        name: body
            .get("Name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|n| !n.is_empty() && n != "None"),
    }
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

pub fn parse_daily_series(ticker: &Ticker, body: &Value) -> Result<PriceSeries, ScreenerError> {
    let series = body
        .get(DAILY_SERIES_KEY)
        .ok_or_else(|| ScreenerError::unavailable(ticker.as_str(), "response has no daily series"))?;

    let raw: BTreeMap<String, DailyBar> = serde_json::from_value(series.clone()).map_err(|e| {
        ScreenerError::unavailable(ticker.as_str(), format!("malformed daily series: {e}"))
    })?;
    if raw.is_empty() {
        return Err(ScreenerError::unavailable(
            ticker.as_str(),
            "provider returned an empty price series",
        ));
    }

    let bad = |what: &str, date: &str| {
        ScreenerError::unavailable(ticker.as_str(), format!("invalid {what} on {date}"))
    };

    let mut bars = Vec::with_capacity(raw.len());
    // BTreeMap iteration over ISO dates is already oldest-first.
    for (date_str, bar) in &raw {
        let date_str = date_str.as_str();
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| bad("date", date_str))?;
        let num = |s: &str, what: &str| s.trim().parse::<f64>().map_err(|_| bad(what, date_str));
        bars.push(PriceBar {
            date,
            open: num(&bar.open, "open")?,
            high: num(&bar.high, "high")?,
            low: num(&bar.low, "low")?,
            close: num(&bar.close, "close")?,
            volume: bar
                .volume
                .trim()
                .parse::<i64>()
                .map_err(|_| bad("volume", date_str))?,
        });
    }
    PriceSeries::new(bars)
}
