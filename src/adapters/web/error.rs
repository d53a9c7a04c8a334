//! HTTP error responses for web adapter.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::domain::error::ScreenerError;

use super::templates::ErrorTemplate;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
    pub full_page: bool,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            full_page: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Render inside the page shell instead of as a bare fragment.
    pub fn page(mut self, full_page: bool) -> Self {
        self.full_page = full_page;
        self
    }
}

pub fn status_from_error(err: &ScreenerError) -> StatusCode {
    match err {
        ScreenerError::InvalidTicker { .. } => StatusCode::BAD_REQUEST,
        ScreenerError::InsufficientHistory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ScreenerError::DataUnavailable { .. } | ScreenerError::InvalidPriceSeries { .. } => {
            StatusCode::BAD_GATEWAY
        }
        ScreenerError::ConfigParse { .. }
        | ScreenerError::ConfigMissing { .. }
        | ScreenerError::ConfigInvalid { .. }
        | ScreenerError::Storage { .. }
        | ScreenerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ScreenerError> for WebError {
    fn from(err: ScreenerError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl From<askama::Error> for WebError {
    fn from(err: askama::Error) -> Self {
        Self::internal(format!("template error: {err}"))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), message = %self.message, "request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), message = %self.message, "request rejected");
        }
        let template = ErrorTemplate {
            full_page: self.full_page,
            status: self.status.as_u16(),
            message: self.message.clone(),
        };
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.message).into_response(),
        }
    }
}
