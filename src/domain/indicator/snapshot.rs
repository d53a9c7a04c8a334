//! Latest indicator values for one ticker.

use crate::domain::error::ScreenerError;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::performance::{
    trailing_return, SESSIONS_1M, SESSIONS_3M, SESSIONS_6M,
};
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::{calculate_sma, calculate_volume_sma};
use crate::domain::indicator::{
    ATR_PERIOD, RSI_PERIOD, SMA_LONG, SMA_MID, SMA_SHORT, VOLUME_PERIOD,
};
use crate::domain::price::PriceSeries;

/// `None` in any field means the history was too short for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub price: Option<f64>,
    pub volume: Option<i64>,
    pub sma50: Option<f64>,
    pub sma100: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub avg_volume: Option<f64>,
    pub perf_1m: Option<f64>,
    pub perf_3m: Option<f64>,
    pub perf_6m: Option<f64>,
}

pub fn compute_indicators(series: &PriceSeries) -> IndicatorSnapshot {
    let last = series.last();
    IndicatorSnapshot {
        price: last.map(|b| b.close),
        volume: last.map(|b| b.volume),
        sma50: calculate_sma(series, SMA_SHORT).latest(),
        sma100: calculate_sma(series, SMA_MID).latest(),
        sma200: calculate_sma(series, SMA_LONG).latest(),
        rsi: calculate_rsi(series, RSI_PERIOD).latest(),
        atr: calculate_atr(series, ATR_PERIOD).latest(),
        avg_volume: calculate_volume_sma(series, VOLUME_PERIOD).latest(),
        perf_1m: trailing_return(series, SESSIONS_1M),
        perf_3m: trailing_return(series, SESSIONS_3M),
        perf_6m: trailing_return(series, SESSIONS_6M),
    }
}

/// Fail with `InsufficientHistory` when fewer than `minimum` bars exist.
pub fn require_history(
    ticker: &str,
    series: &PriceSeries,
    minimum: usize,
) -> Result<(), ScreenerError> {
    if series.len() < minimum {
        return Err(ScreenerError::InsufficientHistory {
            ticker: ticker.to_string(),
            bars: series.len(),
            minimum,
        });
    }
    Ok(())
}

impl IndicatorSnapshot {
    /// Names of the headline indicators that could not be computed.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.sma50.is_none() {
            missing.push("SMA(50)");
        }
        if self.sma200.is_none() {
            missing.push("SMA(200)");
        }
        if self.rsi.is_none() {
            missing.push("RSI(14)");
        }
        missing
    }
}
