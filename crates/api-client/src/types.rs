// In crates/api-client/src/types.rs

//! Wire formats of the Yahoo Finance JSON endpoints. Only the fields the
//! scanner reads are modelled.

use serde::Deserialize;

/// Envelope of `GET /v8/finance/chart/{symbol}`.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    pub meta: ChartMeta,
    /// Bar open times, in seconds since the epoch.
    pub timestamp: Option<Vec<i64>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    /// Exchange offset from UTC in seconds, used to date each bar in exchange time.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    pub quote: Vec<Quote>,
}

/// Column-oriented OHLCV arrays. Holidays and halts show up as `null`s.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Quote {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
pub struct YahooError {
    pub code: String,
    pub description: String,
}

/// Envelope shared by the trending and predefined-screener endpoints.
#[derive(Debug, Deserialize)]
pub struct FinanceResponse {
    pub finance: FinanceEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct FinanceEnvelope {
    pub result: Option<Vec<QuoteList>>,
    pub error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteList {
    #[serde(default)]
    pub quotes: Vec<QuoteSymbol>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSymbol {
    pub symbol: String,
}
