//! Provider capability trait.

use async_trait::async_trait;

use crate::errors::GatewayError;
use crate::models::entry::TimeSeriesEntries;

/// The single capability every upstream provider exposes: resolve a ticker
/// to its normalized price history. Route handlers dispatch on this trait
/// rather than on concrete clients.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Short identifier used in logs.
    fn id(&self) -> &'static str;

    /// Fetch the full normalized history for a ticker, sorted ascending
    /// by date.
    async fn fetch(&self, ticker: &str) -> Result<TimeSeriesEntries, GatewayError>;
}
