//! RSI (Relative Strength Index).
//!
//! Average gain and average loss are simple means of the last n
//! day-over-day close changes (no Wilder smoothing).
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If avg_gain == 0 and avg_loss > 0: RSI = 0
//! If both are zero (flat window): RSI = 50
//!
//! Warmup: first n bars are invalid (need n price changes).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PriceSeries;

pub const FLAT_RSI: f64 = 50.0;

pub fn calculate_rsi(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let bars = series.bars();
    if period == 0 || bars.len() < 2 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint::invalid(bars[0].date));

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

    for (i, bar) in bars.iter().enumerate().skip(1) {
        let idx = i - 1;
        let change = changes[idx];
        gain_sum += change.max(0.0);
        loss_sum += (-change).max(0.0);

        if idx >= period {
            let dropped = changes[idx - period];
            gain_sum -= dropped.max(0.0);
            loss_sum -= (-dropped).max(0.0);
        }

        if idx + 1 < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let avg_gain = clamp_noise(gain_sum) / period as f64;
        let avg_loss = clamp_noise(loss_sum) / period as f64;
        values.push(IndicatorPoint::valid(bar.date, rsi_from_averages(avg_gain, avg_loss)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    match (avg_gain > 0.0, avg_loss > 0.0) {
        (false, false) => FLAT_RSI,
        (true, false) => 100.0,
        (false, true) => 0.0,
        (true, true) => 100.0 - (100.0 / (1.0 + avg_gain / avg_loss)),
    }
}

// Rolling subtraction leaves tiny residues where the window is truly flat.
fn clamp_noise(sum: f64) -> f64 {
    if sum.abs() < 1e-9 { 0.0 } else { sum }
}
