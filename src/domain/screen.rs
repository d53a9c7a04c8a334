//! Screening pipeline: fetch, compute indicators, score.
//!
//! Every ticker is handled independently. A failure for one ticker is
//! recorded in the report and the batch carries on with the next.

use crate::domain::error::ScreenerError;
use crate::domain::fundamentals::{FundamentalSnapshot, MarketData};
use crate::domain::indicator::snapshot::{compute_indicators, IndicatorSnapshot};
use crate::domain::price::PriceSeries;
use crate::domain::scoring::{score, MomentumInputs, QvmScore};
use crate::domain::swing::{check_swing, SwingChecks, SwingThresholds};
use crate::domain::ticker::Ticker;
use crate::ports::market_data_port::MarketDataPort;
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct ScreenResult {
    pub ticker: Ticker,
    pub fundamentals: FundamentalSnapshot,
    pub indicators: IndicatorSnapshot,
    pub swing: SwingChecks,
    pub score: QvmScore,
    pub prices: PriceSeries,
}

#[derive(Debug, Clone)]
pub struct ScreenFailure {
    pub ticker: Ticker,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenReport {
    pub results: Vec<ScreenResult>,
    pub failures: Vec<ScreenFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leader {
    pub ticker: Ticker,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaders {
    pub average_composite: f64,
    pub best_quality: Leader,
    pub best_value: Leader,
    pub best_momentum: Leader,
}

/// Pure part of the pipeline, shared by single and batch screening.
pub fn evaluate(data: MarketData, thresholds: &SwingThresholds) -> ScreenResult {
    let indicators = compute_indicators(&data.prices);
    let swing = check_swing(&indicators, thresholds);
    let score = score(&data.fundamentals, &MomentumInputs::from(&indicators));
    ScreenResult {
        ticker: data.ticker,
        fundamentals: data.fundamentals,
        indicators,
        swing,
        score,
        prices: data.prices,
    }
}

pub async fn screen_ticker(
    port: &dyn MarketDataPort,
    ticker: &Ticker,
    thresholds: &SwingThresholds,
) -> Result<ScreenResult, ScreenerError> {
    let data = port.fetch(ticker).await?;
    if data.prices.is_empty() {
        return Err(ScreenerError::unavailable(
            ticker.as_str(),
            "provider returned no price history",
        ));
    }
    let result = evaluate(data, thresholds);
    tracing::debug!(
        ticker = %result.ticker,
        composite = result.score.composite,
        bars = result.prices.len(),
        "scored ticker"
    );
    Ok(result)
}

/// Screen tickers one after another.
pub async fn screen_all(
    port: &dyn MarketDataPort,
    tickers: &[Ticker],
    thresholds: &SwingThresholds,
) -> ScreenReport {
    let mut report = ScreenReport::default();
    for ticker in tickers {
        match screen_ticker(port, ticker, thresholds).await {
            Ok(result) => report.results.push(result),
            Err(e) => {
                tracing::warn!(ticker = %ticker, error = %e, "screen failed");
                report.failures.push(ScreenFailure {
                    ticker: ticker.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    tracing::info!(
        screened = report.results.len(),
        failed = report.failures.len(),
        provider = port.name(),
        "screen complete"
    );
    report
}

impl ScreenReport {
    /// Highest composite first; ties broken by ticker.
    pub fn ranked(&self) -> Vec<&ScreenResult> {
        let mut ranked: Vec<&ScreenResult> = self.results.iter().collect();
        ranked.sort_by(|a, b| {
            b.score
                .composite
                .partial_cmp(&a.score.composite)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        ranked
    }

    pub fn leaders(&self) -> Option<Leaders> {
        if self.results.is_empty() {
            return None;
        }
        let average_composite = self.results.iter().map(|r| r.score.composite).sum::<f64>()
            / self.results.len() as f64;
        Some(Leaders {
            average_composite,
            best_quality: self.best_by(|s| s.quality)?,
            best_value: self.best_by(|s| s.value)?,
            best_momentum: self.best_by(|s| s.momentum)?,
        })
    }

    /// Results passing every swing check, in ranking order.
    pub fn swing_candidates(&self) -> Vec<&ScreenResult> {
        self.ranked()
            .into_iter()
            .filter(|r| r.swing.all_passed())
            .collect()
    }

    fn best_by(&self, key: impl Fn(&QvmScore) -> f64) -> Option<Leader> {
        self.results
            .iter()
            .fold(None::<&ScreenResult>, |best, r| match best {
                Some(b) if key(&b.score) >= key(&r.score) => Some(b),
                _ => Some(r),
            })
            .map(|r| Leader {
                ticker: r.ticker.clone(),
                score: key(&r.score),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(symbol: &str, quality: f64, value: f64, momentum: f64) -> ScreenResult {
        ScreenResult {
            ticker: Ticker::parse(symbol).unwrap(),
            fundamentals: FundamentalSnapshot::default(),
            indicators: IndicatorSnapshot::default(),
            swing: SwingChecks::default(),
            score: QvmScore {
                quality,
                value,
                momentum,
                composite: (quality + value + momentum) / 3.0,
            },
            prices: PriceSeries::default(),
        }
    }

    #[test]
    fn ranked_orders_by_composite_then_ticker() {
        let report = ScreenReport {
            results: vec![
                result("MSFT", 60.0, 60.0, 60.0),
                result("AAPL", 90.0, 90.0, 90.0),
                result("AMD", 60.0, 60.0, 60.0),
            ],
            failures: vec![],
        };
        let order: Vec<&str> = report.ranked().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "AMD", "MSFT"]);
    }

    #[test]
    fn leaders_pick_best_per_factor() {
        let report = ScreenReport {
            results: vec![
                result("XOM", 30.0, 90.0, 40.0),
                result("NVDA", 95.0, 10.0, 85.0),
            ],
            failures: vec![],
        };
        let leaders = report.leaders().unwrap();
        assert_eq!(leaders.best_quality.ticker.as_str(), "NVDA");
        assert_eq!(leaders.best_value.ticker.as_str(), "XOM");
        assert_eq!(leaders.best_momentum.ticker.as_str(), "NVDA");
        assert!((leaders.average_composite - (160.0 / 3.0 + 190.0 / 3.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn swing_candidates_keep_only_full_passes() {
        let all = SwingChecks {
            trend: true,
            volume: true,
            volatility: true,
            momentum: true,
        };
        let mut weak = result("AMD", 40.0, 40.0, 40.0);
        weak.swing = all;
        let mut strong = result("NVDA", 80.0, 80.0, 80.0);
        strong.swing = all;
        let mut partial = result("MSFT", 90.0, 90.0, 90.0);
        partial.swing = SwingChecks {
            volume: false,
            ..all
        };
        let report = ScreenReport {
            results: vec![weak, partial, strong],
            failures: vec![],
        };
        let tickers: Vec<&str> = report
            .swing_candidates()
            .iter()
            .map(|r| r.ticker.as_str())
            .collect();
        assert_eq!(tickers, vec!["NVDA", "AMD"]);
        assert!(ScreenReport::default().swing_candidates().is_empty());
    }

    #[test]
    fn leaders_none_when_empty() {
        assert!(ScreenReport::default().leaders().is_none());
    }
}
