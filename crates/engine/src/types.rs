// In crates/engine/src/types.rs

use analytics::IndicatorSet;
use chrono::{DateTime, Days, NaiveDate, Utc};
use core_types::{CrossoverEvent, DateRange, PriceSeries, Symbol};
use serde::Serialize;

/// How much price history to fetch for each symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    /// The configured number of calendar days up to and including today.
    Lookback,
    /// Everything the provider has.
    AllHistory,
    /// An explicit start, and an end that defaults to tomorrow (so today is included).
    Explicit {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
}

impl HistoryWindow {
    /// Resolves the window into a half-open date range ending after `today`.
    pub fn resolve(&self, today: NaiveDate, lookback_days: u32) -> core_types::Result<DateRange> {
        let tomorrow = today.succ_opt().unwrap_or(NaiveDate::MAX);
        match *self {
            Self::Lookback => {
                let start = today
                    .checked_sub_days(Days::new(u64::from(lookback_days)))
                    .unwrap_or(NaiveDate::MIN);
                DateRange::new(start, tomorrow)
            }
            Self::AllHistory => DateRange::new(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(today), tomorrow),
            Self::Explicit { start, end } => DateRange::new(start, end.unwrap_or(tomorrow)),
        }
    }
}

/// What a single scan session should look at.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Scan only this symbol instead of the discovered set.
    pub symbol: Option<Symbol>,
    pub window: HistoryWindow,
    /// Scan the single requested symbol even if a store excludes it.
    pub force: bool,
    /// The session clock; every store decision in the session uses it.
    pub as_of: DateTime<Utc>,
}

impl ScanRequest {
    pub fn discovered(as_of: DateTime<Utc>) -> Self {
        Self {
            symbol: None,
            window: HistoryWindow::Lookback,
            force: false,
            as_of,
        }
    }

    pub fn single(symbol: Symbol, as_of: DateTime<Utc>) -> Self {
        Self {
            symbol: Some(symbol),
            ..Self::discovered(as_of)
        }
    }
}

/// Everything computed for a symbol that produced a signal, handed read-only
/// to a `ChartRenderer`.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolAnalysis {
    pub series: PriceSeries,
    pub indicators: IndicatorSet,
    /// Every crossover in the fetched history, oldest first.
    pub events: Vec<CrossoverEvent>,
    /// The recent events that made this symbol actionable.
    pub signals: Vec<CrossoverEvent>,
}

impl SymbolAnalysis {
    pub fn symbol(&self) -> &Symbol {
        self.series.symbol()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SymbolStatus {
    /// At least one recent crossover passed the signal policy.
    Signal,
    /// The series was analysed but nothing recent qualified.
    NoSignal,
    /// The provider failed or returned nothing; carries the reason.
    NoData(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub symbol: Symbol,
    pub status: SymbolStatus,
    /// Qualifying events, present only for `SymbolStatus::Signal`.
    pub signals: Vec<CrossoverEvent>,
    pub last_close: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Zero-based position of the batch in the session.
    pub index: usize,
    pub symbols: Vec<SymbolReport>,
}

impl BatchReport {
    pub fn signal_count(&self) -> usize {
        self.symbols
            .iter()
            .filter(|s| s.status == SymbolStatus::Signal)
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Symbols acquired before store filtering.
    pub candidates: usize,
    /// Symbols removed by the skip-list or cooldown.
    pub excluded: usize,
    pub range: DateRange,
    pub batches: Vec<BatchReport>,
    /// The caller declined to continue before every batch ran.
    pub stopped_early: bool,
}

impl ScanReport {
    pub fn symbols(&self) -> impl Iterator<Item = &SymbolReport> {
        self.batches.iter().flat_map(|b| b.symbols.iter())
    }

    pub fn processed(&self) -> usize {
        self.batches.iter().map(|b| b.symbols.len()).sum()
    }

    pub fn signals(&self) -> impl Iterator<Item = &SymbolReport> {
        self.symbols().filter(|s| s.status == SymbolStatus::Signal)
    }
}
