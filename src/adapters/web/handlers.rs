//! HTTP request handlers for web adapter.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;

use crate::adapters::chart_svg::{render_price_chart, ChartPeriod};
use crate::domain::error::ScreenerError;
use crate::domain::screen::{screen_all, screen_ticker};
use crate::domain::swing::SwingThresholds;
use crate::domain::ticker::Ticker;
use crate::ports::report_port::ScanView;

use super::templates::{
    CardView, DashboardTemplate, PeriodLink, ScanDisplay, ScanTemplate, TickerTemplate,
    WatchlistRow, WatchlistTemplate,
};
use super::{is_htmx_request, AppState, WebError};

fn html(template: &impl Template) -> Result<Response, WebError> {
    Ok(Html(template.render()?).into_response())
}

fn watchlist_rows(state: &AppState) -> Result<Vec<WatchlistRow>, WebError> {
    let list = state
        .watchlist
        .lock()
        .map_err(|_| WebError::internal("watchlist lock poisoned"))?;
    Ok(list.list().into_iter().map(WatchlistRow::from).collect())
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let full_page = !is_htmx_request(&headers);
    let template = DashboardTemplate {
        full_page,
        entries: watchlist_rows(&state).map_err(|e| e.page(full_page))?,
        message: None,
        volume_multiplier: format!("{}", state.thresholds.volume_multiplier),
        atr_percent: format!("{}", state.thresholds.atr_threshold * 100.0),
    };
    html(&template)
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct AddForm {
    #[serde(default)]
    pub ticker: String,
}

/// Apply a watchlist change and persist it under the lock. A failed save
/// rolls the in-memory list back so it never drifts from the store.
fn mutate_watchlist(
    state: &AppState,
    change: impl FnOnce(&mut crate::domain::watchlist::Watchlist) -> bool,
) -> Result<bool, WebError> {
    let mut list = state
        .watchlist
        .lock()
        .map_err(|_| WebError::internal("watchlist lock poisoned"))?;
    let before = list.clone();
    let changed = change(&mut list);
    if changed {
        if let Err(e) = state.store.save(&list) {
            *list = before;
            return Err(e.into());
        }
    }
    Ok(changed)
}

fn watchlist_response(
    state: &AppState,
    headers: &HeaderMap,
    message: String,
) -> Result<Response, WebError> {
    if is_htmx_request(headers) {
        html(&WatchlistTemplate {
            entries: watchlist_rows(state)?,
            message: Some(message),
        })
    } else {
        Ok(Redirect::to("/").into_response())
    }
}

pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AddForm>,
) -> Result<Response, WebError> {
    let full_page = !is_htmx_request(&headers);
    let ticker = Ticker::parse(&form.ticker).map_err(|e| WebError::from(e).page(full_page))?;
    let today = chrono::Local::now().date_naive();

    let added = mutate_watchlist(&state, |list| list.add(ticker.clone(), today))
        .map_err(|e| e.page(full_page))?;
    let message = if added {
        tracing::info!(ticker = %ticker, "added to watchlist");
        format!("Added {ticker}")
    } else {
        format!("{ticker} is already on the watchlist")
    };
    watchlist_response(&state, &headers, message)
}

pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(ticker): Path<String>,
) -> Result<Response, WebError> {
    let full_page = !is_htmx_request(&headers);
    let ticker = Ticker::parse(&ticker).map_err(|e| WebError::from(e).page(full_page))?;

    let removed =
        mutate_watchlist(&state, |list| list.remove(&ticker)).map_err(|e| e.page(full_page))?;
    let message = if removed {
        tracing::info!(ticker = %ticker, "removed from watchlist");
        format!("Removed {ticker}")
    } else {
        format!("{ticker} was not on the watchlist")
    };
    watchlist_response(&state, &headers, message)
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ScanForm {
    #[serde(default)]
    pub view: String,
    #[serde(default)]
    pub volume_multiplier: String,
    /// Percent of price, e.g. `2` for 2%.
    #[serde(default)]
    pub atr_threshold: String,
}

impl ScanForm {
    fn thresholds(&self, defaults: SwingThresholds) -> Result<SwingThresholds, WebError> {
        let parse = |raw: &str, name: &str| -> Result<Option<f64>, WebError> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| WebError::bad_request(format!("{name} must be a number")))
        };

        let volume_multiplier = parse(&self.volume_multiplier, "volume multiplier")?
            .unwrap_or(defaults.volume_multiplier);
        if volume_multiplier <= 0.0 {
            return Err(WebError::bad_request("volume multiplier must be positive"));
        }

        let atr_threshold = match parse(&self.atr_threshold, "ATR threshold")? {
            Some(pct) if (0.0..100.0).contains(&pct) => pct / 100.0,
            Some(_) => {
                return Err(WebError::bad_request(
                    "ATR threshold must be a percentage between 0 and 100",
                ));
            }
            None => defaults.atr_threshold,
        };

        Ok(SwingThresholds {
            volume_multiplier,
            atr_threshold,
        })
    }
}

pub async fn scan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ScanForm>,
) -> Result<Response, WebError> {
    let full_page = !is_htmx_request(&headers);
    let view: ScanView = form
        .view
        .parse()
        .map_err(|e: String| WebError::bad_request(e).page(full_page))?;
    let thresholds = form
        .thresholds(state.thresholds)
        .map_err(|e| e.page(full_page))?;

    let tickers = {
        let list = state
            .watchlist
            .lock()
            .map_err(|_| WebError::internal("watchlist lock poisoned").page(full_page))?;
        list.tickers()
    };

    let report = screen_all(state.market_data.as_ref(), &tickers, &thresholds).await;
    html(&ScanTemplate {
        full_page,
        show_cards: view == ScanView::Cards,
        scan: ScanDisplay::from_report(&report),
    })
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

impl PeriodQuery {
    fn period(&self) -> Result<ChartPeriod, WebError> {
        match self.period.as_deref() {
            None | Some("") => Ok(ChartPeriod::default()),
            Some(raw) => raw
                .parse::<ChartPeriod>()
                .map_err(|e: String| WebError::bad_request(e)),
        }
    }
}

pub async fn ticker_detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(ticker): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, WebError> {
    let full_page = !is_htmx_request(&headers);
    let period = query.period().map_err(|e| e.page(full_page))?;
    let ticker = Ticker::parse(&ticker).map_err(|e| WebError::from(e).page(full_page))?;

    let result = screen_ticker(state.market_data.as_ref(), &ticker, &state.thresholds)
        .await
        .map_err(|e| WebError::from(e).page(full_page))?;

    let periods = [
        ChartPeriod::SixMonths,
        ChartPeriod::OneYear,
        ChartPeriod::TwoYears,
    ]
    .iter()
    .map(|p| PeriodLink {
        label: p.label(),
        current: *p == period,
    })
    .collect();

    html(&TickerTemplate {
        full_page,
        card: CardView::from_result(&result),
        period: period.label(),
        periods,
    })
}

pub async fn ticker_chart(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, WebError> {
    let period = query.period()?;
    let ticker = Ticker::parse(&ticker)?;

    let data = state.market_data.fetch(&ticker).await?;
    if data.prices.is_empty() {
        return Err(
            ScreenerError::unavailable(ticker.as_str(), "provider returned no price history")
                .into(),
        );
    }
    let svg = render_price_chart(&ticker, &data.prices, period)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/svg+xml")],
        svg,
    )
        .into_response())
}

pub async fn not_found(headers: HeaderMap) -> WebError {
    WebError::not_found("Page not found").page(!is_htmx_request(&headers))
}
