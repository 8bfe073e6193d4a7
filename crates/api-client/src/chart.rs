// In crates/api-client/src/chart.rs

use crate::types::{ChartData, ChartResponse};
use crate::{Error, PriceHistoryProvider, Result, YahooClient};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use core_types::{DateRange, PriceBar, PriceSeries, Symbol};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::BTreeMap;

#[async_trait]
impl PriceHistoryProvider for YahooClient {
    fn name(&self) -> &'static str {
        "YahooFinance"
    }

    /// Fetches daily bars through `GET /v8/finance/chart/{symbol}`.
    async fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.settings.chart_base_url.trim_end_matches('/'),
            symbol
        );
        let query = [
            ("period1", epoch_seconds(range.start).to_string()),
            ("period2", epoch_seconds(range.end).to_string()),
            ("interval", "1d".to_string()),
            ("events", "history".to_string()),
        ];

        let response: ChartResponse = self.get_json(&url, &query).await?;
        let series = series_from_chart(symbol, response, range)?;

        tracing::debug!(symbol = %symbol, bars = series.len(), "Fetched price history.");
        Ok(series)
    }
}

fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Converts a chart payload into a `PriceSeries` restricted to `range`.
///
/// Rows with any missing field are dropped. Bars are keyed by their date in
/// exchange time, so a duplicated date keeps the last row seen.
pub fn series_from_chart(
    symbol: &Symbol,
    response: ChartResponse,
    range: DateRange,
) -> Result<PriceSeries> {
    if let Some(error) = response.chart.error {
        return Err(Error::ApiError {
            code: error.code,
            msg: error.description,
        });
    }

    let data = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| Error::NoData(symbol.to_string()))?;

    let bars = bars_from_chart(data, range);
    if bars.is_empty() {
        return Err(Error::NoData(symbol.to_string()));
    }

    Ok(PriceSeries::new(symbol.clone(), bars)?)
}

fn bars_from_chart(data: ChartData, range: DateRange) -> Vec<PriceBar> {
    let timestamps = data.timestamp.unwrap_or_default();
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return Vec::new();
    };
    let offset = data.meta.gmtoffset;

    let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        if !range.contains(date) {
            continue;
        }

        let field = |column: &[Option<f64>]| column.get(i).copied().flatten().and_then(Decimal::from_f64);
        let volume = quote.volume.get(i).copied().flatten().map(Decimal::from);

        if let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            volume,
        ) {
            by_date.insert(
                date,
                PriceBar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume,
                },
            );
        }
    }

    by_date.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn range() -> DateRange {
        DateRange::parse("2024-01-02", "2024-01-06").unwrap()
    }

    fn sym() -> Symbol {
        Symbol::new("AAPL").unwrap()
    }

    fn parse(value: serde_json::Value) -> ChartResponse {
        serde_json::from_value(value).unwrap()
    }

    // 2024-01-02..05 at 14:30 UTC, i.e. the New York open.
    const TIMESTAMPS: [i64; 4] = [1704205800, 1704292200, 1704378600, 1704465000];

    #[test]
    fn converts_rows_and_drops_incomplete_ones() {
        let response = parse(json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL", "gmtoffset": -18000 },
                    "timestamp": TIMESTAMPS,
                    "indicators": { "quote": [{
                        "open":   [185.0, 184.0, null,  182.0],
                        "high":   [186.0, 185.0, 184.0, 183.0],
                        "low":    [184.0, 183.0, 182.0, 181.0],
                        "close":  [185.5, 184.5, 183.5, 182.5],
                        "volume": [100,   200,   300,   400]
                    }]}
                }],
                "error": null
            }
        }));

        let series = series_from_chart(&sym(), response, range()).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(series.closes(), vec![185.5, 184.5, 182.5]);
    }

    #[test]
    fn bars_outside_the_range_are_dropped() {
        let response = parse(json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL", "gmtoffset": -18000 },
                    "timestamp": TIMESTAMPS,
                    "indicators": { "quote": [{
                        "open":   [1.0, 1.0, 1.0, 1.0],
                        "high":   [1.0, 1.0, 1.0, 1.0],
                        "low":    [1.0, 1.0, 1.0, 1.0],
                        "close":  [1.0, 2.0, 3.0, 4.0],
                        "volume": [1, 1, 1, 1]
                    }]}
                }],
                "error": null
            }
        }));
        let narrow = DateRange::parse("2024-01-03", "2024-01-05").unwrap();

        let series = series_from_chart(&sym(), response, narrow).unwrap();

        assert_eq!(series.closes(), vec![2.0, 3.0]);
    }

    #[test]
    fn yahoo_error_object_becomes_api_error() {
        let response = parse(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }));

        let err = series_from_chart(&sym(), response, range()).unwrap_err();
        assert!(matches!(err, Error::ApiError { ref code, .. } if code == "Not Found"));
    }

    #[test]
    fn result_without_rows_is_no_data() {
        let response = parse(json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL" },
                    "indicators": { "quote": [{}] }
                }],
                "error": null
            }
        }));

        let err = series_from_chart(&sym(), response, range()).unwrap_err();
        assert!(matches!(err, Error::NoData(ref s) if s == "AAPL"));
    }

    #[test]
    fn period_bounds_are_midnight_utc() {
        assert_eq!(epoch_seconds(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 1704067200);
    }
}
