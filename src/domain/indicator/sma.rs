//! Simple Moving Average.
//!
//! O(n) sliding window sum. SMA(n) at bar i is the mean of closes
//! i-n+1..=i. Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PriceSeries;

pub fn calculate_sma(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let closes = series.closes();
    rolling(series, &closes, IndicatorType::Sma(period), period)
}

/// SMA of traded volume, used for the relative-volume check.
pub fn calculate_volume_sma(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let volumes: Vec<f64> = series.bars().iter().map(|b| b.volume as f64).collect();
    rolling(series, &volumes, IndicatorType::VolumeSma(period), period)
}

fn rolling(
    series: &PriceSeries,
    inputs: &[f64],
    indicator_type: IndicatorType,
    period: usize,
) -> IndicatorSeries {
    let bars = series.bars();
    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += inputs[i];
        if i >= period {
            window_sum -= inputs[i - period];
        }

        if i + 1 >= period {
            values.push(IndicatorPoint::valid(bar.date, window_sum / period as f64));
        } else {
            values.push(IndicatorPoint::invalid(bar.date));
        }
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
