//! Inline SVG price chart: close price with SMA(50) and SMA(200) overlays.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::domain::error::ScreenerError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::snapshot::require_history;
use crate::domain::indicator::{IndicatorSeries, SMA_LONG, SMA_SHORT};
use crate::domain::price::PriceSeries;
use crate::domain::ticker::Ticker;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 320.0;
const PADDING: f64 = 48.0;

pub const PRICE_COLOR: &str = "#2563eb";
pub const SMA_SHORT_COLOR: &str = "#f59e0b";
pub const SMA_LONG_COLOR: &str = "#dc2626";

/// Chart window in trading sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartPeriod {
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
}

impl ChartPeriod {
    pub fn sessions(&self) -> usize {
        match self {
            ChartPeriod::SixMonths => 126,
            ChartPeriod::OneYear => 252,
            ChartPeriod::TwoYears => 504,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartPeriod::SixMonths => "6mo",
            ChartPeriod::OneYear => "1y",
            ChartPeriod::TwoYears => "2y",
        }
    }
}

impl FromStr for ChartPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "6mo" => Ok(ChartPeriod::SixMonths),
            "1y" => Ok(ChartPeriod::OneYear),
            "2y" => Ok(ChartPeriod::TwoYears),
            other => Err(format!("unknown chart period {:?} (expected 6mo, 1y or 2y)", other)),
        }
    }
}

/// Needs at least [`SMA_SHORT`] bars; fails with `InsufficientHistory`
/// otherwise. Moving averages are computed over the full series before the
/// window is cut so the overlays start at the left edge when history allows.
pub fn render_price_chart(
    ticker: &Ticker,
    series: &PriceSeries,
    period: ChartPeriod,
) -> Result<String, ScreenerError> {
    require_history(ticker.as_str(), series, SMA_SHORT)?;

    let sma_short = calculate_sma(series, SMA_SHORT);
    let sma_long = calculate_sma(series, SMA_LONG);

    let start = series.len().saturating_sub(period.sessions());
    let bars = &series.bars()[start..];
    let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
    let short = window(&sma_short, start);
    let long = window(&sma_long, start);

    let (min, max) = closes
        .iter()
        .chain(short.iter())
        .chain(long.iter())
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if bars.len() > 1 {
        plot_width / (bars.len() - 1) as f64
    } else {
        0.0
    };
    let project = |i: usize, v: f64| {
        let x = PADDING + i as f64 * scale_x;
        let y = if range > 0.0 {
            HEIGHT - PADDING - (v - min) * scale_y
        } else {
            HEIGHT / 2.0
        };
        (x, y)
    };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="100%" role="img" aria-label="{t} price chart">"#,
        w = WIDTH,
        h = HEIGHT,
        t = ticker
    );
    let _ = write!(
        svg,
        r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = write!(
        svg,
        r##"<line x1="{p}" y1="{b}" x2="{r}" y2="{b}" stroke="#cbd5e1"/><line x1="{p}" y1="{p}" x2="{p}" y2="{b}" stroke="#cbd5e1"/>"##,
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING
    );

    for (values, color, name) in [
        (&short, SMA_SHORT_COLOR, "SMA(50)"),
        (&long, SMA_LONG_COLOR, "SMA(200)"),
        (&closes, PRICE_COLOR, "Close"),
    ] {
        let points = polyline_points(values, &project);
        if !points.is_empty() {
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{points}"><title>{name}</title></polyline>"#
            );
        }
    }

    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        let _ = write!(
            svg,
            r##"<text x="{p}" y="{y}" font-size="11" fill="#475569">{first}</text><text x="{r}" y="{y}" font-size="11" fill="#475569" text-anchor="end">{last}</text>"##,
            p = PADDING,
            r = WIDTH - PADDING,
            y = HEIGHT - PADDING + 16.0,
            first = first.date,
            last = last.date
        );
    }
    let _ = write!(
        svg,
        r##"<text x="{x}" y="{top}" font-size="11" fill="#475569" text-anchor="end">{max:.2}</text><text x="{x}" y="{bottom}" font-size="11" fill="#475569" text-anchor="end">{min:.2}</text>"##,
        x = PADDING - 4.0,
        top = PADDING + 4.0,
        bottom = HEIGHT - PADDING
    );

    let legend = [
        ("Close", PRICE_COLOR),
        ("SMA(50)", SMA_SHORT_COLOR),
        ("SMA(200)", SMA_LONG_COLOR),
    ];
    for (i, (label, color)) in legend.iter().enumerate() {
        let x = PADDING + i as f64 * 90.0;
        let _ = write!(
            svg,
            r#"<rect x="{x}" y="14" width="12" height="4" fill="{color}"/><text x="{tx}" y="20" font-size="11">{label}</text>"#,
            tx = x + 16.0
        );
    }
    let _ = write!(
        svg,
        r#"<text x="{x}" y="20" font-size="12" text-anchor="end">{ticker} · {period}</text>"#,
        x = WIDTH - PADDING,
        period = period.label()
    );
    svg.push_str("</svg>");
    Ok(svg)
}

fn window(series: &IndicatorSeries, start: usize) -> Vec<Option<f64>> {
    series.values[start..].iter().map(|p| p.get()).collect()
}

fn polyline_points(values: &[Option<f64>], project: &impl Fn(usize, f64) -> (f64, f64)) -> String {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| project(i, v)))
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}
