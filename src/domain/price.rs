//! Daily price bars and the validated price series built from them.

use crate::domain::error::ScreenerError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Bars in strictly increasing date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, ScreenerError> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ScreenerError::InvalidPriceSeries {
                    reason: format!(
                        "dates must be strictly increasing ({} follows {})",
                        pair[1].date, pair[0].date
                    ),
                });
            }
        }
        Ok(Self { bars })
    }

    /// Sort by date first; duplicate dates are still rejected.
    pub fn from_unsorted(mut bars: Vec<PriceBar>) -> Result<Self, ScreenerError> {
        bars.sort_by_key(|b| b.date);
        Self::new(bars)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}
