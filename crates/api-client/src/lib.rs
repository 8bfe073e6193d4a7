// In crates/api-client/src/lib.rs

use async_trait::async_trait;
use core_types::{DateRange, PriceSeries, Symbol};

pub mod chart;
pub mod client;
pub mod discovery;
pub mod error;
pub mod types;

// Re-export public types
pub use client::YahooClient;
pub use error::{Error, Result};

/// A source of daily price history.
///
/// Implementations fetch bars for `range` (start inclusive, end exclusive) and
/// return them as a date-ordered `PriceSeries`. A series shorter than any
/// moving-average window is a valid answer, not an error.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// The name of the provider (e.g., "YahooFinance").
    fn name(&self) -> &'static str;

    /// Fetches daily bars for `symbol` within `range`.
    async fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<PriceSeries>;
}

/// A source of symbols worth scanning.
#[async_trait]
pub trait SymbolDiscoverer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns a deduplicated set of symbols, or `Error::Unavailable` when no
    /// category could be read.
    async fn discover(&self) -> Result<Vec<Symbol>>;
}
