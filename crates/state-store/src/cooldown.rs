// In crates/state-store/src/cooldown.rs

use crate::file::{load_or_default, write_atomic};
use crate::{Result, StateStore};
use chrono::{DateTime, Duration, Utc};
use core_types::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// How long a cooldown lasts, with its unit kept explicit on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Horizon {
    Hours(u32),
    Days(u32),
}

impl Horizon {
    /// `None` when the horizon is too long to represent.
    pub fn duration(&self) -> Option<Duration> {
        match *self {
            Self::Hours(hours) => Duration::try_hours(i64::from(hours)),
            Self::Days(days) => Duration::try_days(i64::from(days)),
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hours(h) => write!(f, "{h}h"),
            Self::Days(d) => write!(f, "{d}d"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownEntry {
    pub recorded_at: DateTime<Utc>,
    pub horizon: Horizon,
}

impl CooldownEntry {
    /// `None` when the expiry falls outside the representable date range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.horizon
            .duration()
            .and_then(|d| self.recorded_at.checked_add_signed(d))
    }
}

/// The action that starts a cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownAction {
    /// A scan produced a qualifying signal; uses the configured hours horizon.
    SignalDetected,
    /// The user reported selling the symbol.
    Sold { days: u32 },
}

/// Symbols temporarily excluded after an action taken on them.
#[derive(Debug)]
pub struct CooldownList {
    path: PathBuf,
    signal_hours: u32,
    entries: BTreeMap<Symbol, CooldownEntry>,
    dirty: bool,
}

impl CooldownList {
    /// Loads the list from `path`, dropping entries already expired at `now`
    /// and entries whose expiry cannot be computed.
    pub fn load(path: impl AsRef<Path>, signal_hours: u32, now: DateTime<Utc>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut entries: BTreeMap<Symbol, CooldownEntry> = load_or_default(&path, "cooldown");

        let before = entries.len();
        entries.retain(|symbol, entry| match entry.expires_at() {
            Some(expires_at) => now < expires_at,
            None => {
                tracing::warn!(
                    symbol = %symbol,
                    horizon = %entry.horizon,
                    path = %path.display(),
                    "Dropping cooldown entry with an out-of-range expiry."
                );
                false
            }
        });
        let pruned = before - entries.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned expired cooldown entries.");
        }

        Self {
            path,
            signal_hours,
            entries,
            dirty: pruned > 0,
        }
    }

    pub fn entry(&self, symbol: &Symbol) -> Option<&CooldownEntry> {
        self.entries.get(symbol)
    }

    pub fn remove(&mut self, symbol: &Symbol) -> bool {
        let removed = self.entries.remove(symbol).is_some();
        self.dirty |= removed;
        removed
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.dirty = true;
        }
    }

    pub fn active_count(&self, now: DateTime<Utc>) -> usize {
        self.entries.keys().filter(|s| self.is_active(s, now)).count()
    }

    fn horizon_for(&self, action: CooldownAction) -> Horizon {
        match action {
            CooldownAction::SignalDetected => Horizon::Hours(self.signal_hours),
            CooldownAction::Sold { days } => Horizon::Days(days),
        }
    }
}

impl StateStore for CooldownList {
    type Key = Symbol;
    type Outcome = CooldownAction;

    fn is_active(&self, symbol: &Symbol, now: DateTime<Utc>) -> bool {
        self.entries
            .get(symbol)
            .and_then(CooldownEntry::expires_at)
            .is_some_and(|expires_at| now < expires_at)
    }

    /// Starts a cooldown. An existing cooldown that runs longer is kept.
    fn record_outcome(&mut self, symbol: &Symbol, now: DateTime<Utc>, action: CooldownAction) {
        let entry = CooldownEntry {
            recorded_at: now,
            horizon: self.horizon_for(action),
        };

        let Some(expires_at) = entry.expires_at() else {
            tracing::warn!(symbol = %symbol, horizon = %entry.horizon, "Cooldown horizon out of range, not recorded.");
            return;
        };

        if let Some(existing) = self.entries.get(symbol) {
            if existing.expires_at().is_some_and(|e| e >= expires_at) {
                tracing::debug!(symbol = %symbol, horizon = %existing.horizon, "Keeping longer existing cooldown.");
                return;
            }
        }

        tracing::debug!(symbol = %symbol, horizon = %entry.horizon, "Starting cooldown.");
        self.entries.insert(symbol.clone(), entry);
        self.dirty = true;
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        write_atomic(&self.path, &self.entries)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, h, 0, 0).unwrap()
    }

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[test]
    fn signal_cooldown_is_measured_in_hours() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = CooldownList::load(dir.path().join("cd.json"), 24, at(1, 10));
        list.record_outcome(&sym("NVDA"), at(1, 10), CooldownAction::SignalDetected);

        assert!(list.is_active(&sym("NVDA"), at(2, 9)));
        assert!(!list.is_active(&sym("NVDA"), at(2, 10)));
    }

    #[test]
    fn sold_cooldown_is_measured_in_days() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = CooldownList::load(dir.path().join("cd.json"), 24, at(1, 10));
        list.record_outcome(&sym("AMD"), at(1, 10), CooldownAction::Sold { days: 2 });

        assert_eq!(list.entry(&sym("AMD")).unwrap().horizon, Horizon::Days(2));
        assert!(list.is_active(&sym("AMD"), at(3, 9)));
        assert!(!list.is_active(&sym("AMD"), at(3, 10)));
    }

    #[test]
    fn shorter_cooldown_does_not_cut_a_longer_one_short() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = CooldownList::load(dir.path().join("cd.json"), 24, at(1, 10));
        list.record_outcome(&sym("AMD"), at(1, 10), CooldownAction::Sold { days: 2 });
        list.record_outcome(&sym("AMD"), at(1, 12), CooldownAction::SignalDetected);

        assert_eq!(list.entry(&sym("AMD")).unwrap().horizon, Horizon::Days(2));
        assert!(list.is_active(&sym("AMD"), at(3, 0)));
    }

    #[test]
    fn persisted_entries_carry_their_unit_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cd.json");
        let mut list = CooldownList::load(&path, 12, at(1, 0));
        list.record_outcome(&sym("A"), at(1, 0), CooldownAction::SignalDetected);
        list.record_outcome(&sym("B"), at(1, 0), CooldownAction::Sold { days: 3 });
        list.flush().unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["A"]["horizon"], serde_json::json!({ "unit": "hours", "value": 12 }));
        assert_eq!(raw["B"]["horizon"], serde_json::json!({ "unit": "days", "value": 3 }));

        // A's 12 hours have elapsed by the second day, B's three days have not.
        let reloaded = CooldownList::load(&path, 12, at(2, 0));
        assert!(reloaded.entry(&sym("A")).is_none());
        assert!(reloaded.is_active(&sym("B"), at(2, 0)));
        assert!(reloaded.is_dirty());
    }

    #[test]
    fn entry_with_out_of_range_expiry_is_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cd.json");
        std::fs::write(
            &path,
            r#"{"X":{"recorded_at":"2024-01-01T00:00:00Z","horizon":{"unit":"days","value":4000000000}},
                "Y":{"recorded_at":"2024-05-01T00:00:00Z","horizon":{"unit":"days","value":5}}}"#,
        )
        .unwrap();

        let list = CooldownList::load(&path, 24, at(2, 0));

        assert!(list.entry(&sym("X")).is_none());
        assert!(!list.is_active(&sym("X"), at(2, 0)));
        assert!(list.is_active(&sym("Y"), at(2, 0)));
        assert!(list.is_dirty());
    }

    #[test]
    fn out_of_range_sold_horizon_is_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = CooldownList::load(dir.path().join("cd.json"), 24, at(1, 0));
        list.record_outcome(&sym("X"), at(1, 0), CooldownAction::Sold { days: u32::MAX });

        assert!(list.entry(&sym("X")).is_none());
        assert!(!list.is_dirty());
    }
}
