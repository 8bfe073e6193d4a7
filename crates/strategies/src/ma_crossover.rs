// In crates/strategies/src/ma_crossover.rs

use crate::types::CrossoverSettings;
use crate::{Error, Result, Strategy};
use analytics::{IndicatorSet, sma};
use chrono::NaiveDate;
use core_types::{CrossoverEvent, CrossoverKind, PriceSeries, Symbol};
use std::cmp::Ordering;

/// Golden/death cross detection between two simple moving averages.
#[derive(Debug, Clone)]
pub struct MACrossover {
    settings: CrossoverSettings,
}

impl MACrossover {
    /// Creates a new `MACrossover` strategy instance from its settings.
    pub fn new(settings: CrossoverSettings) -> Result<Self> {
        if settings.short_window == 0 || settings.long_window <= settings.short_window {
            return Err(Error::InvalidWindows {
                short: settings.short_window,
                long: settings.long_window,
            });
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &CrossoverSettings {
        &self.settings
    }

    /// Computes both moving averages for `series` and detects crossovers on them.
    pub fn detect(&self, series: &PriceSeries) -> Result<Vec<CrossoverEvent>> {
        let closes = series.closes();
        let short = sma(&closes, self.settings.short_window)?;
        let long = sma(&closes, self.settings.long_window)?;
        Ok(detect_crossovers(series.symbol(), &series.dates(), &short, &long))
    }
}

impl Strategy for MACrossover {
    fn name(&self) -> &'static str {
        "MACrossover"
    }

    fn windows(&self) -> (usize, usize) {
        (self.settings.short_window, self.settings.long_window)
    }

    fn assess(&self, symbol: &Symbol, indicators: &IndicatorSet) -> Vec<CrossoverEvent> {
        detect_crossovers(symbol, &indicators.dates, &indicators.sma_short, &indicators.sma_long)
    }
}

/// Scans two aligned moving-average series and reports every crossing, oldest first.
///
/// A golden cross fires when the short average goes from strictly below the long
/// one to at-or-above it; a death cross is the mirror image. Equal days never
/// replace the last strict relationship, and a kind is never reported twice in
/// a row, so touching the long average and falling back does not re-fire when
/// the real crossing follows.
pub fn detect_crossovers(
    symbol: &Symbol,
    dates: &[NaiveDate],
    short: &[Option<f64>],
    long: &[Option<f64>],
) -> Vec<CrossoverEvent> {
    let len = dates.len().min(short.len()).min(long.len());
    let mut events = Vec::new();
    let mut last_strict: Option<Ordering> = None;
    let mut last_kind: Option<CrossoverKind> = None;

    for i in 0..len {
        let (Some(curr_short), Some(curr_long)) = (short[i], long[i]) else {
            continue;
        };
        let Some(relation) = curr_short.partial_cmp(&curr_long) else {
            continue;
        };

        let kind = match (last_strict, relation) {
            (Some(Ordering::Less), Ordering::Equal | Ordering::Greater) => Some(CrossoverKind::GoldenCross),
            (Some(Ordering::Greater), Ordering::Equal | Ordering::Less) => Some(CrossoverKind::DeathCross),
            _ => None,
        };

        if let Some(kind) = kind.filter(|k| last_kind != Some(*k)) {
            events.push(CrossoverEvent {
                symbol: symbol.clone(),
                date: dates[i],
                kind,
            });
            last_kind = Some(kind);
        }

        if relation != Ordering::Equal {
            last_strict = Some(relation);
        }
    }

    events
}

/// Keeps only the events dated on or after `cutoff`.
pub fn filter_recent(events: &[CrossoverEvent], cutoff: NaiveDate) -> Vec<CrossoverEvent> {
    events.iter().filter(|e| e.date >= cutoff).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::IndicatorEngine;
    use chrono::Duration;
    use core_types::PriceBar;
    use rust_decimal::Decimal;
    use rust_decimal::prelude::FromPrimitive;

    fn symbol() -> Symbol {
        Symbol::new("XYZ").unwrap()
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn dates(n: usize) -> Vec<NaiveDate> {
        (0..n).map(|i| start() + Duration::days(i as i64)).collect()
    }

    fn defined(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .zip(dates(closes.len()))
            .map(|(c, date)| {
                let close = Decimal::from_f64(*c).unwrap();
                PriceBar {
                    date,
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: Decimal::ONE,
                }
            })
            .collect();
        PriceSeries::new(symbol(), bars).unwrap()
    }

    /// 250 closes: a slow slide, a sharp rally, then a sell-off.
    fn rally_then_selloff() -> Vec<f64> {
        let mut closes = Vec::with_capacity(250);
        let mut price = 200.0;
        for i in 0..250 {
            if i < 170 {
                price -= 0.5;
            } else if i < 200 {
                price += 3.0;
            } else {
                price -= 4.0;
            }
            closes.push(price);
        }
        closes
    }

    #[test]
    fn rejects_long_window_not_greater_than_short() {
        let settings = CrossoverSettings {
            short_window: 50,
            long_window: 50,
        };
        assert_eq!(
            MACrossover::new(settings).unwrap_err(),
            Error::InvalidWindows { short: 50, long: 50 }
        );
    }

    #[test]
    fn fewer_bars_than_long_window_yields_no_events() {
        let strategy = MACrossover::new(CrossoverSettings {
            short_window: 3,
            long_window: 10,
        })
        .unwrap();
        for n in 0..10 {
            let closes: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 1.0 } else { 9.0 }).collect();
            assert!(strategy.detect(&series(&closes)).unwrap().is_empty(), "n = {n}");
        }
    }

    #[test]
    fn no_flip_yields_no_events() {
        let d = dates(5);
        let below = detect_crossovers(
            &symbol(),
            &d,
            &defined(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            &defined(&[2.0, 3.0, 4.0, 5.0, 6.0]),
        );
        assert!(below.is_empty());

        let above = detect_crossovers(
            &symbol(),
            &d,
            &defined(&[9.0, 9.0, 9.0, 9.0, 9.0]),
            &defined(&[1.0, 2.0, 3.0, 4.0, 5.0]),
        );
        assert!(above.is_empty());
    }

    #[test]
    fn single_upward_crossing_is_one_golden_cross_at_the_flip() {
        let d = dates(5);
        let events = detect_crossovers(
            &symbol(),
            &d,
            &defined(&[1.0, 2.0, 3.0, 6.0, 7.0]),
            &defined(&[5.0, 5.0, 5.0, 5.0, 5.0]),
        );
        assert_eq!(
            events,
            vec![CrossoverEvent {
                symbol: symbol(),
                date: d[3],
                kind: CrossoverKind::GoldenCross,
            }]
        );
    }

    #[test]
    fn touching_counts_once_and_flat_equality_does_not_retrigger() {
        let d = dates(6);
        // below, equal, equal, equal, above, above
        let events = detect_crossovers(
            &symbol(),
            &d,
            &defined(&[4.0, 5.0, 5.0, 5.0, 6.0, 7.0]),
            &defined(&[5.0, 5.0, 5.0, 5.0, 5.0, 5.0]),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, d[1]);
        assert_eq!(events[0].kind, CrossoverKind::GoldenCross);
    }

    #[test]
    fn touch_and_retreat_then_real_cross_is_one_golden_cross() {
        let d = dates(4);
        // below, touch, back below, above
        let events = detect_crossovers(
            &symbol(),
            &d,
            &defined(&[4.0, 5.0, 4.0, 6.0]),
            &defined(&[5.0, 5.0, 5.0, 5.0]),
        );
        assert_eq!(
            events,
            vec![CrossoverEvent {
                symbol: symbol(),
                date: d[1],
                kind: CrossoverKind::GoldenCross,
            }]
        );
    }

    #[test]
    fn crossings_alternate_after_a_touch() {
        let d = dates(6);
        // below, touch, below, above, equal, below
        let events = detect_crossovers(
            &symbol(),
            &d,
            &defined(&[4.0, 5.0, 4.0, 6.0, 5.0, 3.0]),
            &defined(&[5.0, 5.0, 5.0, 5.0, 5.0, 5.0]),
        );
        let kinds: Vec<_> = events.iter().map(|e| (e.date, e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (d[1], CrossoverKind::GoldenCross),
                (d[4], CrossoverKind::DeathCross),
            ]
        );
    }

    #[test]
    fn downward_crossing_is_a_death_cross() {
        let d = dates(4);
        let events = detect_crossovers(
            &symbol(),
            &d,
            &defined(&[8.0, 7.0, 5.0, 4.0]),
            &defined(&[5.0, 5.0, 5.0, 5.0]),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CrossoverKind::DeathCross);
        assert_eq!(events[0].date, d[2]);
    }

    #[test]
    fn undefined_prefix_is_skipped() {
        let d = dates(5);
        let short = vec![None, Some(1.0), Some(1.0), Some(3.0), Some(3.0)];
        let long = vec![None, None, Some(2.0), Some(2.0), Some(2.0)];
        let events = detect_crossovers(&symbol(), &d, &short, &long);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, d[3]);
    }

    #[test]
    fn rally_then_selloff_produces_golden_then_death_cross() {
        let strategy = MACrossover::new(CrossoverSettings::default()).unwrap();
        let s = series(&rally_then_selloff());

        let events = strategy.detect(&s).unwrap();

        assert_eq!(events.len(), 2, "{events:?}");
        assert_eq!(events[0].kind, CrossoverKind::GoldenCross);
        assert_eq!(events[0].date, start() + Duration::days(210));
        assert_eq!(events[1].kind, CrossoverKind::DeathCross);
        assert_eq!(events[1].date, start() + Duration::days(235));
    }

    #[test]
    fn assess_on_indicator_set_matches_detect() {
        let strategy = MACrossover::new(CrossoverSettings::default()).unwrap();
        let s = series(&rally_then_selloff());
        let (short, long) = strategy.windows();
        let indicators = IndicatorEngine::default().calculate(&s, short, long).unwrap();

        assert_eq!(strategy.assess(s.symbol(), &indicators), strategy.detect(&s).unwrap());
    }

    #[test]
    fn recency_filter_only_drops_older_events() {
        let strategy = MACrossover::new(CrossoverSettings::default()).unwrap();
        let events = strategy.detect(&series(&rally_then_selloff())).unwrap();

        let recent = filter_recent(&events, start() + Duration::days(220));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, CrossoverKind::DeathCross);
        assert_eq!(filter_recent(&events, start()), events);
    }
}
