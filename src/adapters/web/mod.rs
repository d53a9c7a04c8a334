//! Web dashboard adapter.
//!
//! Axum server with an HTMX front end: watchlist management, watchlist
//! scans, per-ticker score cards and SVG price charts.

mod error;
mod handlers;
pub mod templates;

pub use error::{status_from_error, WebError};
pub use handlers::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::domain::swing::SwingThresholds;
use crate::domain::watchlist::Watchlist;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::watchlist_port::WatchlistStore;

pub struct AppState {
    pub market_data: Arc<dyn MarketDataPort>,
    pub store: Arc<dyn WatchlistStore>,
    /// Mutated and saved under this lock; never held across an await.
    pub watchlist: Mutex<Watchlist>,
    pub thresholds: SwingThresholds,
}

impl AppState {
    pub fn new(
        market_data: Arc<dyn MarketDataPort>,
        store: Arc<dyn WatchlistStore>,
        watchlist: Watchlist,
        thresholds: SwingThresholds,
    ) -> Self {
        Self {
            market_data,
            store,
            watchlist: Mutex::new(watchlist),
            thresholds,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    build_router_with_static(state, "static")
}

pub fn build_router_with_static(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/watchlist/add", post(handlers::add_to_watchlist))
        .route("/watchlist/remove/{ticker}", post(handlers::remove_from_watchlist))
        .route("/scan", post(handlers::scan))
        .route("/ticker/{ticker}", get(handlers::ticker_detail))
        .route("/ticker/{ticker}/chart", get(handlers::ticker_chart))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
