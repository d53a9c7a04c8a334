//! Market data access port.

use crate::domain::error::ScreenerError;
use crate::domain::fundamentals::MarketData;
use crate::domain::ticker::Ticker;
use std::future::Future;
use std::pin::Pin;

pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<MarketData, ScreenerError>> + Send + 'a>>;

/// Source of fundamentals and daily price history for one ticker.
///
/// Implementations translate their provider's response into
/// [`MarketData`] before returning, and report every failure (timeout,
/// unknown symbol, empty payload) as `ScreenerError::DataUnavailable`.
/// A single attempt is made per call and nothing is cached.
pub trait MarketDataPort: Send + Sync {
    fn fetch<'a>(&'a self, ticker: &'a Ticker) -> FetchFuture<'a>;

    /// Short provider name for logs and page footers.
    fn name(&self) -> &'static str;
}
