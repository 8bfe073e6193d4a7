// In crates/state-store/src/skip_list.rs

use crate::file::{load_or_default, write_atomic};
use crate::types::SkipReason;
use crate::{Result, StateStore};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use core_types::Symbol;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Symbols that recently produced nothing worth looking at, keyed to the day
/// they were marked.
#[derive(Debug)]
pub struct SkipList {
    path: PathBuf,
    skip_days: i64,
    entries: BTreeMap<Symbol, NaiveDate>,
    dirty: bool,
}

impl SkipList {
    /// Loads the skip-list from `path`, dropping entries that have already elapsed.
    pub fn load(path: impl AsRef<Path>, skip_days: u32, now: DateTime<Utc>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut entries: BTreeMap<Symbol, NaiveDate> = load_or_default(&path, "skip_list");
        let skip_days = i64::from(skip_days);

        let today = now.date_naive();
        let before = entries.len();
        entries.retain(|_, marked| today - *marked < Duration::days(skip_days));
        let pruned = before - entries.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned elapsed skip-list entries.");
        }

        Self {
            path,
            skip_days,
            entries,
            dirty: pruned > 0,
        }
    }

    /// The day `symbol` was marked, if it is on the list at all.
    pub fn marked_on(&self, symbol: &Symbol) -> Option<NaiveDate> {
        self.entries.get(symbol).copied()
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

    /// Number of entries still in force at `now`.
    pub fn active_count(&self, now: DateTime<Utc>) -> usize {
        self.entries.keys().filter(|s| self.is_active(s, now)).count()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for SkipList {
    type Key = Symbol;
    type Outcome = SkipReason;

    fn is_active(&self, symbol: &Symbol, now: DateTime<Utc>) -> bool {
        self.entries
            .get(symbol)
            .is_some_and(|marked| now.date_naive() - *marked < Duration::days(self.skip_days))
    }

    fn record_outcome(&mut self, symbol: &Symbol, now: DateTime<Utc>, reason: SkipReason) {
        tracing::debug!(symbol = %symbol, %reason, "Adding symbol to skip-list.");
        self.entries.insert(symbol.clone(), now.date_naive());
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
