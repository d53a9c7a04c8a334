//! Average True Range.
//!
//! ATR(n) at bar i is the mean of the true ranges i-n+1..=i. The first
//! bar's true range is high - low. Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PriceSeries;

pub fn calculate_atr(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let bars = series.bars();
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Atr(period),
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        };
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += tr_values[i];
        if i >= period {
            window_sum -= tr_values[i - period];
        }

        if i + 1 >= period {
            values.push(IndicatorPoint::valid(bar.date, window_sum / period as f64));
        } else {
            values.push(IndicatorPoint::invalid(bar.date));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
