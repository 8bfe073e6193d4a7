// In crates/api-client/src/discovery.rs

use crate::types::FinanceResponse;
use crate::{Error, Result, SymbolDiscoverer, YahooClient};
use app_config::DiscoveryCategory;
use async_trait::async_trait;
use core_types::Symbol;
use std::collections::BTreeSet;

#[async_trait]
impl SymbolDiscoverer for YahooClient {
    fn name(&self) -> &'static str {
        "YahooFinance"
    }

    /// Reads every configured category and unions the results.
    async fn discover(&self) -> Result<Vec<Symbol>> {
        let mut outcomes = Vec::with_capacity(self.settings.categories.len());
        for category in &self.settings.categories {
            outcomes.push((*category, self.fetch_category(*category).await));
        }
        merge_categories(outcomes)
    }
}

impl YahooClient {
    async fn fetch_category(&self, category: DiscoveryCategory) -> Result<Vec<Symbol>> {
        let base = self.settings.discovery_base_url.trim_end_matches('/');
        let response: FinanceResponse = match category.screener_id() {
            None => {
                let url = format!("{}/v1/finance/trending/{}", base, self.settings.region);
                self.get_json(&url, &[("count", self.settings.screener_count.to_string())])
                    .await?
            }
            Some(screener) => {
                let url = format!("{}/v1/finance/screener/predefined/saved", base);
                let query = [
                    ("scrIds", screener.to_string()),
                    ("count", self.settings.screener_count.to_string()),
                ];
                self.get_json(&url, &query).await?
            }
        };
        symbols_from_finance(response)
    }
}

/// Extracts equity symbols from a trending or screener payload.
pub fn symbols_from_finance(response: FinanceResponse) -> Result<Vec<Symbol>> {
    if let Some(error) = response.finance.error {
        return Err(Error::ApiError {
            code: error.code,
            msg: error.description,
        });
    }

    Ok(response
        .finance
        .result
        .unwrap_or_default()
        .into_iter()
        .flat_map(|list| list.quotes)
        .filter(|quote| is_equity_ticker(&quote.symbol))
        .filter_map(|quote| Symbol::new(&quote.symbol).ok())
        .collect())
}

/// Indices (`^GSPC`) and currency pairs (`EURUSD=X`) are not scannable stocks.
fn is_equity_ticker(raw: &str) -> bool {
    !raw.contains('^') && !raw.contains('=')
}

/// Unions per-category results. A failed category is logged and skipped;
/// the call only fails when nothing at all was discovered.
pub fn merge_categories(
    outcomes: Vec<(DiscoveryCategory, Result<Vec<Symbol>>)>,
) -> Result<Vec<Symbol>> {
    let mut symbols = BTreeSet::new();
    let mut failures = Vec::new();

    for (category, outcome) in outcomes {
        match outcome {
            Ok(found) => {
                tracing::debug!(%category, count = found.len(), "Discovered symbols.");
                symbols.extend(found);
            }
            Err(e) => {
                tracing::warn!(%category, error = %e, "Discovery category failed, skipping.");
                failures.push(format!("{category}: {e}"));
            }
        }
    }

    if symbols.is_empty() {
        let reason = if failures.is_empty() {
            "every category returned an empty list".to_string()
        } else {
            failures.join("; ")
        };
        return Err(Error::Unavailable(reason));
    }

    tracing::info!(count = symbols.len(), "Symbol discovery complete.");
    Ok(symbols.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn syms(list: &[&str]) -> Vec<Symbol> {
        list.iter().map(|s| Symbol::new(s).unwrap()).collect()
    }

    #[test]
    fn parses_quotes_and_drops_indices_and_currencies() {
        let response: FinanceResponse = serde_json::from_value(json!({
            "finance": {
                "result": [{
                    "count": 4,
                    "quotes": [
                        { "symbol": "NVDA" },
                        { "symbol": "^GSPC" },
                        { "symbol": "EURUSD=X" },
                        { "symbol": "BRK-B" }
                    ]
                }],
                "error": null
            }
        }))
        .unwrap();

        assert_eq!(symbols_from_finance(response).unwrap(), syms(&["NVDA", "BRK-B"]));
    }

    #[test]
    fn finance_error_object_is_reported() {
        let response: FinanceResponse = serde_json::from_value(json!({
            "finance": {
                "result": null,
                "error": { "code": "Bad Request", "description": "Invalid scrIds" }
            }
        }))
        .unwrap();

        assert!(matches!(symbols_from_finance(response), Err(Error::ApiError { .. })));
    }

    #[test]
    fn merge_dedups_and_skips_failed_categories() {
        let merged = merge_categories(vec![
            (DiscoveryCategory::MostActive, Ok(syms(&["AAPL", "TSLA"]))),
            (DiscoveryCategory::Trending, Err(Error::NoData("trending".into()))),
            (DiscoveryCategory::Gainers, Ok(syms(&["TSLA", "AMD"]))),
        ])
        .unwrap();

        assert_eq!(merged, syms(&["AAPL", "AMD", "TSLA"]));
    }

    #[test]
    fn merge_is_unavailable_when_nothing_was_found() {
        let all_failed = merge_categories(vec![
            (DiscoveryCategory::Trending, Err(Error::NoData("trending".into()))),
            (DiscoveryCategory::Losers, Err(Error::NoData("losers".into()))),
        ]);
        assert!(matches!(all_failed, Err(Error::Unavailable(_))));

        let all_empty = merge_categories(vec![(DiscoveryCategory::Gainers, Ok(Vec::new()))]);
        assert!(matches!(all_empty, Err(Error::Unavailable(_))));
    }
}
