#![cfg(feature = "web")]
//! Web handler integration tests.
//!
//! Tests cover:
//! - Dashboard as full page and as HTMX fragment
//! - Watchlist add/remove, persistence and rollback on a failed save
//! - Scans in cards and ranking view, form validation
//! - Ticker detail, SVG chart and error statuses

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use qvmscreen::adapters::memory_watchlist_store::MemoryWatchlistStore;
use qvmscreen::adapters::web::{build_router, AppState};
use qvmscreen::domain::error::ScreenerError;
use qvmscreen::domain::fundamentals::FundamentalSnapshot;
use qvmscreen::domain::swing::SwingThresholds;
use qvmscreen::domain::ticker::Ticker;
use qvmscreen::domain::watchlist::Watchlist;
use qvmscreen::ports::watchlist_port::WatchlistStore;
use std::sync::Arc;
use tower::ServiceExt;

use common::*;

fn starting_watchlist() -> Watchlist {
    let added = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let mut list = Watchlist::new();
    list.add(Ticker::parse("REF").unwrap(), added);
    list.add(Ticker::parse("GONE").unwrap(), added);
    list
}

fn mock_port() -> MockMarketData {
    MockMarketData::new()
        .with_data("REF", reference_fundamentals(), flat_then_rising())
        .with_data(
            "SHORT",
            FundamentalSnapshot::default(),
            series_from_closes("2024-01-01", &[10.0; 10]),
        )
}

fn create_test_app_with_store(store: Arc<dyn WatchlistStore>) -> Router {
    let state = AppState::new(
        Arc::new(mock_port()),
        store,
        starting_watchlist(),
        SwingThresholds::default(),
    );
    build_router(state)
}

fn create_test_app() -> (Router, Arc<MemoryWatchlistStore>) {
    let store = Arc::new(MemoryWatchlistStore::new());
    (create_test_app_with_store(store.clone()), store)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn htmx_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("HX-Request", "true")
        .body(Body::empty())
        .unwrap()
}

fn htmx_post(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("HX-Request", "true")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

struct FailingStore;

impl WatchlistStore for FailingStore {
    fn load(&self) -> Result<Option<Watchlist>, ScreenerError> {
        Ok(None)
    }

    fn save(&self, _watchlist: &Watchlist) -> Result<(), ScreenerError> {
        Err(ScreenerError::storage("disk full"))
    }
}

mod dashboard {
    use super::*;

    #[tokio::test]
    async fn full_page_has_shell_and_watchlist() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("htmx.org"));
        assert!(body.contains("Watchlist (2)"));
        assert!(body.contains("/ticker/REF"));
        assert!(body.contains("2024-05-01"));
        assert!(body.contains("name=\"volume_multiplier\" value=\"1.5\""));
        assert!(body.contains("name=\"atr_threshold\" value=\"2\""));
    }

    #[tokio::test]
    async fn htmx_request_gets_fragment() {
        let (app, _) = create_test_app();
        let response = app.oneshot(htmx_get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(!body.contains("<!DOCTYPE html>"));
        assert!(body.contains("<h1>Dashboard</h1>"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/nowhere")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_string(response).await;
        assert!(body.contains("Page not found"));
        assert!(body.contains("<!DOCTYPE html>"));
    }
}

mod watchlist {
    use super::*;

    #[tokio::test]
    async fn add_persists_and_returns_fragment() {
        let (app, store) = create_test_app();
        let response = app
            .oneshot(htmx_post("/watchlist/add", "ticker=msft"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("Added MSFT"));
        assert!(body.contains("Watchlist (3)"));
        assert!(!body.contains("<!DOCTYPE html>"));

        let saved = store.load().unwrap().unwrap();
        assert!(saved.contains(&Ticker::parse("MSFT").unwrap()));
    }

    #[tokio::test]
    async fn duplicate_add_does_not_save() {
        let (app, store) = create_test_app();
        let response = app
            .oneshot(htmx_post("/watchlist/add", "ticker=REF"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("REF is already on the watchlist"));
        assert!(body.contains("Watchlist (2)"));
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn plain_form_post_redirects_home() {
        let (app, _) = create_test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/watchlist/add")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("ticker=AMD"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn invalid_ticker_is_400() {
        let (app, store) = create_test_app();
        let response = app
            .oneshot(htmx_post("/watchlist/add", "ticker=%21%21"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains("Error 400"));
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_existing_ticker() {
        let (app, store) = create_test_app();
        let response = app
            .oneshot(htmx_post("/watchlist/remove/GONE", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Removed GONE"));
        assert!(body.contains("Watchlist (1)"));

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[tokio::test]
    async fn remove_absent_ticker_is_a_no_op() {
        let (app, store) = create_test_app();
        let response = app
            .oneshot(htmx_post("/watchlist/remove/IBM", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("IBM was not on the watchlist"));
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_save_rolls_back() {
        let app = create_test_app_with_store(Arc::new(FailingStore));

        let response = app
            .clone()
            .oneshot(htmx_post("/watchlist/add", "ticker=MSFT"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("disk full"));

        let response = app.oneshot(htmx_get("/")).await.unwrap();
        let body = body_string(response).await;
        assert!(body.contains("Watchlist (2)"));
        assert!(!body.contains("/ticker/MSFT"));
    }
}

mod scan {
    use super::*;

    #[tokio::test]
    async fn cards_view_with_failure_listed() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(htmx_post("/scan", "view=cards"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("id=\"scan-results\""));
        assert!(body.contains("class=\"cards\""));
        assert!(body.contains("Reference Corp"));
        assert!(body.contains("Skipped"));
        assert!(body.contains("GONE"));
        assert!(body.contains("unknown symbol"));
        assert!(body.contains("Average QVM"));
    }

    #[tokio::test]
    async fn ranking_view() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(htmx_post(
                "/scan",
                "view=ranking&volume_multiplier=2&atr_threshold=1.5",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("<h2>Ranking</h2>"));
        assert!(body.contains(">REF</a>"));
        assert!(!body.contains("class=\"cards\""));
    }

    #[tokio::test]
    async fn unknown_view_is_400() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(htmx_post("/scan", "view=grid"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn out_of_range_atr_is_400() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(htmx_post("/scan", "atr_threshold=150"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains("between 0 and 100"));
    }

    #[tokio::test]
    async fn non_positive_multiplier_is_400() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(htmx_post("/scan", "volume_multiplier=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

mod ticker {
    use super::*;

    #[tokio::test]
    async fn detail_page_shows_card_and_chart() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/ticker/ref")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("Reference Corp"));
        assert!(body.contains("/ticker/REF/chart?period=1y"));
        assert!(body.contains("<strong>1y</strong>"));
        assert!(body.contains("/ticker/REF?period=6mo"));
    }

    #[tokio::test]
    async fn period_query_selects_window() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(htmx_get("/ticker/REF?period=6mo"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("<strong>6mo</strong>"));
        assert!(body.contains("/ticker/REF/chart?period=6mo"));
    }

    #[tokio::test]
    async fn unknown_period_is_400() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/ticker/REF?period=5y")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn provider_failure_is_502() {
        let (app, _) = create_test_app();
        let response = app.oneshot(htmx_get("/ticker/NOPE")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_string(response).await;
        assert!(body.contains("Error 502"));
        assert!(body.contains("unknown symbol"));
    }

    #[tokio::test]
    async fn chart_is_svg() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/ticker/REF/chart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/svg+xml"
        );
        let body = body_string(response).await;
        assert!(body.starts_with("<svg"));
        assert!(body.contains("polyline"));
    }

    #[tokio::test]
    async fn chart_on_short_history_is_422() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/ticker/SHORT/chart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
