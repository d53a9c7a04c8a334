//! Swing-trading checklist evaluated alongside the QVM score.

use crate::domain::indicator::snapshot::IndicatorSnapshot;

pub const DEFAULT_VOLUME_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_ATR_THRESHOLD: f64 = 0.02;
pub const RSI_LOWER: f64 = 30.0;
pub const RSI_UPPER: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingThresholds {
    /// Latest volume must exceed the 20-day average by this factor.
    pub volume_multiplier: f64,
    /// Minimum ATR as a fraction of price.
    pub atr_threshold: f64,
}

impl Default for SwingThresholds {
    fn default() -> Self {
        Self {
            volume_multiplier: DEFAULT_VOLUME_MULTIPLIER,
            atr_threshold: DEFAULT_ATR_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwingChecks {
    pub trend: bool,
    pub volume: bool,
    pub volatility: bool,
    pub momentum: bool,
}

impl SwingChecks {
    pub fn passed(&self) -> usize {
        [self.trend, self.volume, self.volatility, self.momentum]
            .iter()
            .filter(|&&ok| ok)
            .count()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == 4
    }

    /// (label, passed) pairs in display order.
    pub fn labelled(&self) -> [(&'static str, bool); 4] {
        [
            ("Trend", self.trend),
            ("Volume", self.volume),
            ("Volatility", self.volatility),
            ("Momentum", self.momentum),
        ]
    }
}

/// A missing indicator fails the check that needs it.
pub fn check_swing(s: &IndicatorSnapshot, t: &SwingThresholds) -> SwingChecks {
    let trend = match (s.price, s.sma50, s.sma100) {
        (Some(price), Some(sma50), Some(sma100)) => price > sma50 && sma50 > sma100,
        _ => false,
    };
    let volume = match (s.volume, s.avg_volume) {
        (Some(vol), Some(avg)) => vol as f64 > avg * t.volume_multiplier,
        _ => false,
    };
    let volatility = match (s.atr, s.price) {
        (Some(atr), Some(price)) if price > 0.0 => atr / price > t.atr_threshold,
        _ => false,
    };
    let momentum = s
        .rsi
        .is_some_and(|rsi| (RSI_LOWER..=RSI_UPPER).contains(&rsi));

    SwingChecks {
        trend,
        volume,
        volatility,
        momentum,
    }
}
