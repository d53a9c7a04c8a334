//! Technical indicators.
//!
//! Each calculator returns an [`IndicatorSeries`] aligned one-to-one with the
//! input bars. Points inside the warmup window carry `valid: false` so that
//! "insufficient history" is never confused with a value of zero.
//! [`snapshot::compute_indicators`] reduces the series to their latest values.

pub mod atr;
pub mod performance;
pub mod rsi;
pub mod sma;
pub mod snapshot;

use chrono::NaiveDate;
use std::fmt;

pub const SMA_SHORT: usize = 50;
pub const SMA_MID: usize = 100;
pub const SMA_LONG: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const VOLUME_PERIOD: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn invalid(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub fn valid(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value,
        }
    }

    pub fn get(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Atr(usize),
    VolumeSma(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at the last bar, `None` while still in warmup.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().and_then(IndicatorPoint::get)
    }

    pub fn valid_points(&self) -> impl Iterator<Item = &IndicatorPoint> {
        self.values.iter().filter(|p| p.valid)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOL_SMA({})", period),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Sma(50).to_string(), "SMA(50)");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(IndicatorType::Atr(14).to_string(), "ATR(14)");
        assert_eq!(IndicatorType::VolumeSma(20).to_string(), "VOL_SMA(20)");
    }

    #[test]
    fn latest_is_none_during_warmup() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(3),
            values: vec![IndicatorPoint::invalid(date)],
        };
        assert_eq!(series.latest(), None);
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(50), "sma50");
        map.insert(IndicatorType::Sma(200), "sma200");

        assert_eq!(map.get(&IndicatorType::Sma(50)), Some(&"sma50"));
        assert_eq!(map.get(&IndicatorType::Sma(200)), Some(&"sma200"));
        assert_eq!(map.get(&IndicatorType::Rsi(50)), None);
    }
}
