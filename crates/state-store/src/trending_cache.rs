// In crates/state-store/src/trending_cache.rs

use crate::file::{load_or_default, write_atomic};
use crate::{Result, StateStore};
use chrono::{DateTime, Duration, Utc};
use core_types::Symbol;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One discovery result and when it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub symbols: Vec<Symbol>,
}

/// Memoized discovery result, reused until the TTL runs out.
#[derive(Debug)]
pub struct TrendingCache {
    path: PathBuf,
    ttl: Duration,
    snapshot: Option<TrendingSnapshot>,
    dirty: bool,
}

impl TrendingCache {
    pub fn load(path: impl AsRef<Path>, ttl_hours: u32) -> Self {
        let path = path.as_ref().to_path_buf();
        let snapshot: Option<TrendingSnapshot> = load_or_default(&path, "trending_cache");
        Self {
            path,
            ttl: Duration::hours(i64::from(ttl_hours)),
            snapshot,
            dirty: false,
        }
    }

    /// The cached symbols, but only while the snapshot is still fresh.
    pub fn fresh_symbols(&self, now: DateTime<Utc>) -> Option<&[Symbol]> {
        if self.is_active(&(), now) {
            self.snapshot.as_ref().map(|s| s.symbols.as_slice())
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> Option<&TrendingSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn clear(&mut self) {
        if self.snapshot.take().is_some() {
            self.dirty = true;
        }
    }
}

impl StateStore for TrendingCache {
    type Key = ();
    type Outcome = Vec<Symbol>;

    fn is_active(&self, _: &(), now: DateTime<Utc>) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| now - s.fetched_at < self.ttl)
    }

    /// Replaces the whole snapshot; stale and fresh sets are never merged.
    fn record_outcome(&mut self, _: &(), now: DateTime<Utc>, mut symbols: Vec<Symbol>) {
        symbols.sort();
        symbols.dedup();
        tracing::debug!(count = symbols.len(), "Caching discovered symbols.");
        self.snapshot = Some(TrendingSnapshot {
            fetched_at: now,
            symbols,
        });
        self.dirty = true;
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        write_atomic(&self.path, &self.snapshot)?;
        self.dirty = false;
        Ok(())
    }
}
