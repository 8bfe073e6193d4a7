// In crates/engine/src/scanner.rs

use crate::types::{BatchReport, ScanReport, ScanRequest, SymbolAnalysis, SymbolReport, SymbolStatus};
use crate::{BatchControl, ChartRenderer, Error, Result};
use analytics::{IndicatorEngine, IndicatorSettings};
use api_client::{PriceHistoryProvider, SymbolDiscoverer};
use app_config::ScanSettings;
use chrono::{DateTime, Days, NaiveDate, Utc};
use core_types::{DateRange, Symbol};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use state_store::{CooldownAction, SkipReason, StateStore, StateStores};
use std::sync::Arc;
use strategies::{MACrossover, Strategy, filter_recent};

/// The scan orchestrator.
///
/// Acquires candidates, filters them through the state stores, and runs them
/// in batches through fetch, indicators and crossover detection. Outcomes are
/// fed back into the stores, which are flushed after every batch.
pub struct Scanner {
    provider: Arc<dyn PriceHistoryProvider>,
    discoverer: Arc<dyn SymbolDiscoverer>,
    strategy: Box<dyn Strategy + Send + Sync>,
    indicators: IndicatorEngine,
    settings: ScanSettings,
}

impl Scanner {
    pub fn new(
        provider: Arc<dyn PriceHistoryProvider>,
        discoverer: Arc<dyn SymbolDiscoverer>,
        settings: ScanSettings,
        indicator_settings: IndicatorSettings,
    ) -> Result<Self> {
        indicator_settings.validate()?;
        for (name, days) in [
            ("lookback_days", settings.lookback_days),
            ("recency_days", settings.recency_days),
        ] {
            if days > app_config::MAX_HISTORY_DAYS {
                return Err(Error::InvalidSettings(format!(
                    "{name} ({days}) must be at most {}",
                    app_config::MAX_HISTORY_DAYS
                )));
            }
        }
        let strategy = MACrossover::new(settings.crossover())?;
        tracing::debug!(
            strategy = strategy.name(),
            short = settings.short_window,
            long = settings.long_window,
            "Scanner initialized."
        );
        Ok(Self {
            provider,
            discoverer,
            strategy: Box::new(strategy),
            indicators: IndicatorEngine::new(indicator_settings),
            settings,
        })
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Returns the trending set, served from the cache while it is fresh.
    ///
    /// A stale or missing cache (or `refresh`) triggers discovery, whose
    /// result replaces the cached snapshot and is persisted immediately.
    pub async fn trending(
        &self,
        stores: &mut StateStores,
        now: DateTime<Utc>,
        refresh: bool,
    ) -> Result<Vec<Symbol>> {
        if !refresh {
            if let Some(cached) = stores.trending.fresh_symbols(now) {
                tracing::info!(count = cached.len(), "Using cached trending symbols.");
                return Ok(cached.to_vec());
            }
        }

        tracing::info!(source = self.discoverer.name(), "Discovering trending symbols...");
        let symbols = self
            .discoverer
            .discover()
            .await
            .map_err(Error::DiscoveryUnavailable)?;

        stores.trending.record_outcome(&(), now, symbols);
        stores.trending.flush()?;
        Ok(stores
            .trending
            .snapshot()
            .map(|snapshot| snapshot.symbols.clone())
            .unwrap_or_default())
    }

    /// Runs a full scan session.
    pub async fn run(
        &self,
        request: &ScanRequest,
        stores: &mut StateStores,
        control: &mut dyn BatchControl,
        renderer: &mut dyn ChartRenderer,
    ) -> Result<ScanReport> {
        let now = request.as_of;
        // Resolved first so a bad range fails before any network call.
        let range = request
            .window
            .resolve(now.date_naive(), self.settings.lookback_days)?;

        let acquired = match &request.symbol {
            Some(symbol) => vec![symbol.clone()],
            None => self.trending(stores, now, false).await?,
        };
        let candidates = acquired.len();

        let bypass = request.force && request.symbol.is_some();
        let mut eligible: Vec<Symbol> = acquired
            .into_iter()
            .filter(|symbol| match stores.exclusion(symbol, now) {
                Some(exclusion) if !bypass => {
                    tracing::debug!(symbol = %symbol, ?exclusion, "Excluding symbol from scan.");
                    false
                }
                _ => true,
            })
            .collect();
        let excluded = candidates - eligible.len();

        if eligible.is_empty() {
            tracing::warn!(candidates, excluded, "Every candidate is excluded.");
            return Err(Error::NoCandidates);
        }

        if self.settings.shuffle && eligible.len() > 1 {
            let mut rng = match self.settings.shuffle_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            eligible.shuffle(&mut rng);
        }

        let batch_size = self.settings.batch_size.max(1);
        let total_batches = eligible.len().div_ceil(batch_size);
        tracing::info!(
            candidates,
            excluded,
            eligible = eligible.len(),
            batches = total_batches,
            %range,
            "Starting scan."
        );

        let mut report = ScanReport {
            candidates,
            excluded,
            range,
            batches: Vec::with_capacity(total_batches),
            stopped_early: false,
        };

        for (index, batch) in eligible.chunks(batch_size).enumerate() {
            let mut symbols = Vec::with_capacity(batch.len());
            for (position, symbol) in batch.iter().enumerate() {
                if position > 0 && self.settings.request_delay_ms > 0 {
                    tokio::time::sleep(std::time::Duration::from_millis(self.settings.request_delay_ms)).await;
                }
                match self.scan_symbol(symbol, range, stores, renderer, now).await {
                    Ok(outcome) => symbols.push(outcome),
                    Err(e) => {
                        if let Err(flush_err) = stores.flush() {
                            tracing::warn!(error = %flush_err, "Failed to persist scan state after an error.");
                        }
                        return Err(e);
                    }
                }
            }

            let batch_report = BatchReport { index, symbols };
            stores.flush()?;
            tracing::info!(
                batch = index + 1,
                of = total_batches,
                signals = batch_report.signal_count(),
                "Batch complete."
            );

            let remaining = total_batches - index - 1;
            let proceed = remaining == 0 || control.continue_after(&batch_report, remaining);
            report.batches.push(batch_report);
            if !proceed {
                tracing::info!(remaining, "Scan stopped at batch boundary.");
                report.stopped_early = true;
                break;
            }
        }

        stores.flush()?;
        Ok(report)
    }

    /// Fetches, analyses and records the outcome for one symbol.
    ///
    /// Provider failures are outcomes, not errors.
    async fn scan_symbol(
        &self,
        symbol: &Symbol,
        range: DateRange,
        stores: &mut StateStores,
        renderer: &mut dyn ChartRenderer,
        now: DateTime<Utc>,
    ) -> Result<SymbolReport> {
        let series = match self.provider.fetch(symbol, range).await {
            Ok(series) if !series.is_empty() => series,
            Ok(_) => return Ok(no_data(symbol, stores, now, "empty price history".to_string())),
            Err(e) => return Ok(no_data(symbol, stores, now, e.to_string())),
        };

        let (short, long) = self.strategy.windows();
        let indicators = self.indicators.calculate(&series, short, long)?;
        let events = self.strategy.assess(symbol, &indicators);

        let cutoff = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(self.settings.recency_days)))
            .unwrap_or(NaiveDate::MIN);
        let signals = self
            .settings
            .signal_policy
            .actionable(&filter_recent(&events, cutoff));
        let last_close = series.closes().last().copied();

        if signals.is_empty() {
            tracing::info!(symbol = %symbol, total_events = events.len(), "No recent crossover.");
            stores.skip_list.record_outcome(symbol, now, SkipReason::NoSignal);
            return Ok(SymbolReport {
                symbol: symbol.clone(),
                status: SymbolStatus::NoSignal,
                signals,
                last_close,
            });
        }

        for event in &signals {
            tracing::info!(symbol = %symbol, date = %event.date, kind = %event.kind, "Crossover signal.");
        }

        stores.skip_list.remove(symbol);
        if self.settings.cooldown_after_signal {
            stores
                .cooldown
                .record_outcome(symbol, now, CooldownAction::SignalDetected);
        }

        let analysis = SymbolAnalysis {
            series,
            indicators,
            events,
            signals,
        };
        if let Err(e) = renderer.render(&analysis) {
            tracing::warn!(symbol = %symbol, renderer = renderer.name(), error = %e, "Failed to render chart.");
        }

        Ok(SymbolReport {
            symbol: symbol.clone(),
            status: SymbolStatus::Signal,
            signals: analysis.signals,
            last_close,
        })
    }
}

fn no_data(symbol: &Symbol, stores: &mut StateStores, now: DateTime<Utc>, reason: String) -> SymbolReport {
    tracing::warn!(symbol = %symbol, %reason, "No price data, skip-listing symbol.");
    stores.skip_list.record_outcome(symbol, now, SkipReason::NoData);
    SymbolReport {
        symbol: symbol.clone(),
        status: SymbolStatus::NoData(reason),
        signals: Vec::new(),
        last_close: None,
    }
}
