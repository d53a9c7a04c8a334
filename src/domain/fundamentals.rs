//! Provider-independent fundamentals and the bundle returned by a fetch.

use crate::domain::price::PriceSeries;
use crate::domain::ticker::Ticker;

/// Fundamental ratios for one ticker. Every field is optional because
/// providers routinely omit some of them. Percent-type fields hold percent
/// units (`2.0` means 2%).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundamentalSnapshot {
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub roe: Option<f64>,
    pub operating_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub market_cap: Option<f64>,
    pub name: Option<String>,
}

impl FundamentalSnapshot {
    /// Number of the six scored fields that are present.
    pub fn scored_field_count(&self) -> usize {
        [
            self.pe_ratio,
            self.pb_ratio,
            self.dividend_yield,
            self.roe,
            self.operating_margin,
            self.revenue_growth,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

/// Everything one fetch returns for a ticker.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub ticker: Ticker,
    pub fundamentals: FundamentalSnapshot,
    pub prices: PriceSeries,
}

/// Fractional ratio (`0.15`) to percent (`15.0`).
pub fn fraction_to_percent(value: Option<f64>) -> Option<f64> {
    value.map(|v| v * 100.0)
}
