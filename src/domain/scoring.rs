//! Quality / Value / Momentum scoring.
//!
//! Each input ratio is mapped linearly onto 0..=100 against a fixed reference
//! range and clamped. A sub-score is the weighted mean of its available
//! components: a missing field is dropped and the remaining weights are
//! re-normalized, so sparse data is not penalized as if it were zero. A
//! sub-score with no components at all is [`NEUTRAL_SCORE`].
//!
//! | Factor    | Component        | Mapping                  | Weight |
//! |-----------|------------------|--------------------------|--------|
//! | Quality   | ROE %            | roe / 30 * 100           | 1      |
//! | Quality   | Operating margin | margin / 30 * 100        | 1      |
//! | Quality   | Revenue growth % | growth / 20 * 100        | 1      |
//! | Value     | P/E (> 0)        | 20 / pe * 50             | 1      |
//! | Value     | P/B (> 0)        | 3 / pb * 50              | 1      |
//! | Value     | Dividend yield % | yield * 20               | 1      |
//! | Momentum  | 1m return %      | 50 + 2 * r               | 0.2    |
//! | Momentum  | 3m return %      | 50 + 1.5 * r             | 0.3    |
//! | Momentum  | 6m return %      | 50 + r                   | 0.5    |
//! | Momentum  | RSI              | 100 - 2 * abs(rsi - 50)  | 0.2    |
//! | Momentum  | Trend vs SMAs    | 100 / 50 / 0             | 0.2    |
//!
//! Composite = (quality + value + momentum) / 3.

use crate::domain::fundamentals::FundamentalSnapshot;
use crate::domain::indicator::snapshot::IndicatorSnapshot;

pub const NEUTRAL_SCORE: f64 = 50.0;

pub const ROE_FULL_MARKS: f64 = 30.0;
pub const MARGIN_FULL_MARKS: f64 = 30.0;
pub const GROWTH_FULL_MARKS: f64 = 20.0;
pub const PE_REFERENCE: f64 = 20.0;
pub const PB_REFERENCE: f64 = 3.0;
pub const YIELD_POINTS_PER_PERCENT: f64 = 20.0;

pub const WEIGHT_PERF_1M: f64 = 0.2;
pub const WEIGHT_PERF_3M: f64 = 0.3;
pub const WEIGHT_PERF_6M: f64 = 0.5;
pub const WEIGHT_RSI: f64 = 0.2;
pub const WEIGHT_TREND: f64 = 0.2;

pub const STRONG_THRESHOLD: f64 = 75.0;
pub const FAIR_THRESHOLD: f64 = 50.0;

/// Price-derived inputs to the momentum factor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MomentumInputs {
    pub price: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi: Option<f64>,
    pub perf_1m: Option<f64>,
    pub perf_3m: Option<f64>,
    pub perf_6m: Option<f64>,
}

impl From<&IndicatorSnapshot> for MomentumInputs {
    fn from(s: &IndicatorSnapshot) -> Self {
        Self {
            price: s.price,
            sma50: s.sma50,
            sma200: s.sma200,
            rsi: s.rsi,
            perf_1m: s.perf_1m,
            perf_3m: s.perf_3m,
            perf_6m: s.perf_6m,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QvmScore {
    pub quality: f64,
    pub value: f64,
    pub momentum: f64,
    pub composite: f64,
}

impl QvmScore {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.composite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= STRONG_THRESHOLD {
            ScoreBand::Strong
        } else if score >= FAIR_THRESHOLD {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ScoreBand::Strong => "score-strong",
            ScoreBand::Fair => "score-fair",
            ScoreBand::Weak => "score-weak",
        }
    }
}

pub fn score(fundamentals: &FundamentalSnapshot, momentum: &MomentumInputs) -> QvmScore {
    let quality = quality_score(fundamentals);
    let value = value_score(fundamentals);
    let momentum = momentum_score(momentum);
    QvmScore {
        quality,
        value,
        momentum,
        composite: clamp_score((quality + value + momentum) / 3.0),
    }
}

pub fn quality_score(f: &FundamentalSnapshot) -> f64 {
    let mut avg = WeightedMean::default();
    avg.add(finite(f.roe).map(|roe| roe / ROE_FULL_MARKS * 100.0), 1.0);
    avg.add(
        finite(f.operating_margin).map(|m| m / MARGIN_FULL_MARKS * 100.0),
        1.0,
    );
    avg.add(
        finite(f.revenue_growth).map(|g| g / GROWTH_FULL_MARKS * 100.0),
        1.0,
    );
    avg.finish()
}

pub fn value_score(f: &FundamentalSnapshot) -> f64 {
    let mut avg = WeightedMean::default();
    avg.add(positive(f.pe_ratio).map(|pe| PE_REFERENCE / pe * 50.0), 1.0);
    avg.add(positive(f.pb_ratio).map(|pb| PB_REFERENCE / pb * 50.0), 1.0);
    avg.add(
        finite(f.dividend_yield).map(|y| y * YIELD_POINTS_PER_PERCENT),
        1.0,
    );
    avg.finish()
}

pub fn momentum_score(m: &MomentumInputs) -> f64 {
    let mut avg = WeightedMean::default();
    avg.add(finite(m.perf_1m).map(|r| 50.0 + r * 2.0), WEIGHT_PERF_1M);
    avg.add(finite(m.perf_3m).map(|r| 50.0 + r * 1.5), WEIGHT_PERF_3M);
    avg.add(finite(m.perf_6m).map(|r| 50.0 + r), WEIGHT_PERF_6M);
    avg.add(
        finite(m.rsi).map(|rsi| 100.0 - (rsi - 50.0).abs() * 2.0),
        WEIGHT_RSI,
    );
    avg.add(trend_component(m), WEIGHT_TREND);
    avg.finish()
}

fn trend_component(m: &MomentumInputs) -> Option<f64> {
    let price = finite(m.price)?;
    let sma50 = finite(m.sma50)?;
    let sma200 = finite(m.sma200)?;
    let above = [sma50, sma200].iter().filter(|&&sma| price > sma).count();
    Some(match above {
        2 => 100.0,
        1 => 50.0,
        _ => 0.0,
    })
}

pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

fn positive(v: Option<f64>) -> Option<f64> {
    finite(v).filter(|x| *x > 0.0)
}

#[derive(Default)]
struct WeightedMean {
    sum: f64,
    weight: f64,
}

impl WeightedMean {
    fn add(&mut self, component: Option<f64>, weight: f64) {
        if let Some(c) = component {
            self.sum += clamp_score(c) * weight;
            self.weight += weight;
        }
    }

    fn finish(&self) -> f64 {
        if self.weight > 0.0 {
            clamp_score(self.sum / self.weight)
        } else {
            NEUTRAL_SCORE
        }
    }
}
