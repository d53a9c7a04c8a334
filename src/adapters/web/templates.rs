//! HTML templates using Askama, plus the display models they render.
//!
//! Every page template carries a `full_page` flag: HTMX requests get the
//! bare fragment, direct navigation gets it wrapped in the page shell.

use askama::Template;

use crate::domain::format::{fmt_market_cap, fmt_opt, fmt_pct};
use crate::domain::screen::{Leaders, ScreenFailure, ScreenReport, ScreenResult};
use crate::domain::scoring::ScoreBand;
use crate::domain::watchlist::WatchlistEntry;

pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

pub struct CheckRow {
    pub label: &'static str,
    pub passed: bool,
}

/// One ticker's score card.
pub struct CardView {
    pub ticker: String,
    pub name: String,
    pub band_class: &'static str,
    pub composite: String,
    pub quality: String,
    pub value: String,
    pub momentum: String,
    pub price: String,
    pub fundamentals: Vec<MetricRow>,
    pub technicals: Vec<MetricRow>,
    pub checks: Vec<CheckRow>,
    pub checks_passed: usize,
    pub missing: String,
}

impl CardView {
    pub fn from_result(r: &ScreenResult) -> Self {
        let f = &r.fundamentals;
        let s = &r.indicators;
        Self {
            ticker: r.ticker.to_string(),
            name: f.name.clone().unwrap_or_default(),
            band_class: r.score.band().css_class(),
            composite: format!("{:.0}", r.score.composite),
            quality: format!("{:.0}", r.score.quality),
            value: format!("{:.0}", r.score.value),
            momentum: format!("{:.0}", r.score.momentum),
            price: fmt_opt(s.price, 2),
            fundamentals: vec![
                MetricRow { label: "P/E", value: fmt_opt(f.pe_ratio, 1) },
                MetricRow { label: "P/B", value: fmt_opt(f.pb_ratio, 1) },
                MetricRow { label: "P/S", value: fmt_opt(f.ps_ratio, 1) },
                MetricRow { label: "Dividend yield", value: fmt_opt(f.dividend_yield, 2) },
                MetricRow { label: "ROE %", value: fmt_opt(f.roe, 1) },
                MetricRow { label: "Operating margin %", value: fmt_opt(f.operating_margin, 1) },
                MetricRow { label: "Revenue growth %", value: fmt_opt(f.revenue_growth, 1) },
                MetricRow { label: "Market cap", value: fmt_market_cap(f.market_cap) },
            ],
            technicals: vec![
                MetricRow { label: "SMA(50)", value: fmt_opt(s.sma50, 2) },
                MetricRow { label: "SMA(200)", value: fmt_opt(s.sma200, 2) },
                MetricRow { label: "RSI(14)", value: fmt_opt(s.rsi, 1) },
                MetricRow { label: "ATR(14)", value: fmt_opt(s.atr, 2) },
                MetricRow { label: "1m", value: fmt_pct(s.perf_1m) },
                MetricRow { label: "3m", value: fmt_pct(s.perf_3m) },
                MetricRow { label: "6m", value: fmt_pct(s.perf_6m) },
            ],
            checks: r
                .swing
                .labelled()
                .iter()
                .map(|&(label, passed)| CheckRow { label, passed })
                .collect(),
            checks_passed: r.swing.passed(),
            missing: s.missing().join(", "),
        }
    }
}

pub struct RankingRow {
    pub rank: usize,
    pub ticker: String,
    pub band_class: &'static str,
    pub composite: String,
    pub quality: String,
    pub value: String,
    pub momentum: String,
    pub price: String,
    pub perf_1m: String,
    pub rsi: String,
    pub checks_passed: usize,
}

impl RankingRow {
    fn from_result(rank: usize, r: &ScreenResult) -> Self {
        Self {
            rank,
            ticker: r.ticker.to_string(),
            band_class: r.score.band().css_class(),
            composite: format!("{:.1}", r.score.composite),
            quality: format!("{:.1}", r.score.quality),
            value: format!("{:.1}", r.score.value),
            momentum: format!("{:.1}", r.score.momentum),
            price: fmt_opt(r.indicators.price, 2),
            perf_1m: fmt_pct(r.indicators.perf_1m),
            rsi: fmt_opt(r.indicators.rsi, 1),
            checks_passed: r.swing.passed(),
        }
    }
}

pub struct LeaderView {
    pub label: &'static str,
    pub ticker: String,
    pub score: String,
    pub band_class: &'static str,
}

pub struct LeadersView {
    pub average_class: &'static str,
    pub average: String,
    pub leaders: Vec<LeaderView>,
}

impl From<&Leaders> for LeadersView {
    fn from(l: &Leaders) -> Self {
        let leader = |label, ticker: &crate::domain::ticker::Ticker, score: f64| LeaderView {
            label,
            ticker: ticker.to_string(),
            score: format!("{:.0}", score),
            band_class: ScoreBand::of(score).css_class(),
        };
        Self {
            average_class: ScoreBand::of(l.average_composite).css_class(),
            average: format!("{:.1}", l.average_composite),
            leaders: vec![
                leader("Best quality", &l.best_quality.ticker, l.best_quality.score),
                leader("Best value", &l.best_value.ticker, l.best_value.score),
                leader("Best momentum", &l.best_momentum.ticker, l.best_momentum.score),
            ],
        }
    }
}

pub struct FailureView {
    pub ticker: String,
    pub message: String,
}

impl From<&ScreenFailure> for FailureView {
    fn from(f: &ScreenFailure) -> Self {
        Self {
            ticker: f.ticker.to_string(),
            message: f.message.clone(),
        }
    }
}

/// Display model for a whole scan, shared by the web page and the file report.
pub struct ScanDisplay {
    pub cards: Vec<CardView>,
    pub ranking: Vec<RankingRow>,
    pub leaders: Option<LeadersView>,
    /// Tickers passing all four swing checks, in rank order.
    pub swing_candidates: Vec<String>,
    pub failures: Vec<FailureView>,
}

impl ScanDisplay {
    /// Cards and ranking rows both follow rank order.
    pub fn from_report(report: &ScreenReport) -> Self {
        let ranked = report.ranked();
        Self {
            cards: ranked.iter().map(|r| CardView::from_result(r)).collect(),
            ranking: ranked
                .iter()
                .enumerate()
                .map(|(i, r)| RankingRow::from_result(i + 1, r))
                .collect(),
            leaders: report.leaders().as_ref().map(LeadersView::from),
            swing_candidates: report
                .swing_candidates()
                .iter()
                .map(|r| r.ticker.to_string())
                .collect(),
            failures: report.failures.iter().map(FailureView::from).collect(),
        }
    }
}

pub struct WatchlistRow {
    pub ticker: String,
    pub added: String,
}

impl From<&WatchlistEntry> for WatchlistRow {
    fn from(e: &WatchlistEntry) -> Self {
        Self {
            ticker: e.ticker.to_string(),
            added: e.added.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub full_page: bool,
    pub entries: Vec<WatchlistRow>,
    pub message: Option<String>,
    pub volume_multiplier: String,
    pub atr_percent: String,
}

#[derive(Template)]
#[template(path = "watchlist.html")]
pub struct WatchlistTemplate {
    pub entries: Vec<WatchlistRow>,
    pub message: Option<String>,
}

#[derive(Template)]
#[template(path = "scan.html")]
pub struct ScanTemplate {
    pub full_page: bool,
    pub show_cards: bool,
    pub scan: ScanDisplay,
}

#[derive(Template)]
#[template(path = "ticker.html")]
pub struct TickerTemplate {
    pub full_page: bool,
    pub card: CardView,
    pub period: &'static str,
    pub periods: Vec<PeriodLink>,
}

pub struct PeriodLink {
    pub label: &'static str,
    pub current: bool,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub full_page: bool,
    pub status: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fundamentals::FundamentalSnapshot;
    use crate::domain::indicator::snapshot::IndicatorSnapshot;
    use crate::domain::price::PriceSeries;
    use crate::domain::scoring::QvmScore;
    use crate::domain::swing::SwingChecks;
    use crate::domain::ticker::Ticker;

    fn result(symbol: &str, composite: f64, swing: SwingChecks) -> ScreenResult {
        ScreenResult {
            ticker: Ticker::parse(symbol).unwrap(),
            fundamentals: FundamentalSnapshot::default(),
            indicators: IndicatorSnapshot {
                price: Some(f64::NAN),
                ..Default::default()
            },
            swing,
            score: QvmScore {
                quality: composite,
                value: composite,
                momentum: composite,
                composite,
            },
            prices: PriceSeries::default(),
        }
    }

    fn render_ranking(report: &ScreenReport) -> String {
        ScanTemplate {
            full_page: false,
            show_cards: false,
            scan: ScanDisplay::from_report(report),
        }
        .render()
        .unwrap()
    }

    #[test]
    fn scan_lists_swing_candidates() {
        let all = SwingChecks {
            trend: true,
            volume: true,
            volatility: true,
            momentum: true,
        };
        let report = ScreenReport {
            results: vec![
                result("AMD", 40.0, all),
                result("MSFT", 90.0, SwingChecks::default()),
                result("NVDA", 70.0, all),
            ],
            failures: vec![],
        };
        let display = ScanDisplay::from_report(&report);
        assert_eq!(display.swing_candidates, vec!["NVDA", "AMD"]);

        let html = render_ranking(&report);
        assert!(html.contains("<h2>Swing candidates</h2>"));
        assert!(html.contains(r#"<li><a href="/ticker/NVDA">NVDA</a></li>"#));
        assert!(!html.contains(r#"<li><a href="/ticker/MSFT">"#));
    }

    #[test]
    fn scan_without_swing_candidates_says_none() {
        let report = ScreenReport {
            results: vec![result("MSFT", 90.0, SwingChecks::default())],
            failures: vec![],
        };
        let html = render_ranking(&report);
        assert!(html.contains("None passed all four checks."));
    }

    #[test]
    fn non_finite_price_renders_as_missing() {
        let report = ScreenReport {
            results: vec![result("MSFT", 90.0, SwingChecks::default())],
            failures: vec![],
        };
        let display = ScanDisplay::from_report(&report);
        assert_eq!(display.ranking[0].price, crate::domain::format::MISSING);
    }

    #[test]
    fn error_fragment_has_no_page_shell() {
        let html = ErrorTemplate {
            full_page: false,
            status: 422,
            message: "insufficient history".into(),
        }
        .render()
        .unwrap();
        assert!(html.contains("422"));
        assert!(html.contains("insufficient history"));
        assert!(!html.contains("<html"));
    }

    #[test]
    fn error_page_has_shell() {
        let html = ErrorTemplate {
            full_page: true,
            status: 404,
            message: "not found".into(),
        }
        .render()
        .unwrap();
        assert!(html.contains("<html"));
    }
}
