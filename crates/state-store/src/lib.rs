// In crates/state-store/src/lib.rs

pub mod cooldown;
pub mod error;
pub mod file;
pub mod skip_list;
pub mod trending_cache;
pub mod types;

pub use cooldown::{CooldownAction, CooldownEntry, CooldownList, Horizon};
pub use error::{Error, Result};
pub use skip_list::SkipList;
pub use trending_cache::{TrendingCache, TrendingSnapshot};
pub use types::{Exclusion, SkipReason, StoreSettings};

use chrono::{DateTime, Utc};
use core_types::Symbol;

/// The contract shared by every persistent symbol store.
///
/// Stores are loaded once per session, mutated in memory, and written back
/// with `flush` at checkpoints.
pub trait StateStore {
    type Key: ?Sized;
    type Outcome;

    /// Whether the entry for `key` is still in force at `now`.
    fn is_active(&self, key: &Self::Key, now: DateTime<Utc>) -> bool;

    fn record_outcome(&mut self, key: &Self::Key, now: DateTime<Utc>, outcome: Self::Outcome);

    /// True when there are in-memory changes not yet written to disk.
    fn is_dirty(&self) -> bool;

    /// Persists pending changes. A no-op on a clean store.
    fn flush(&mut self) -> Result<()>;
}

/// The three stores used by a scan session.
#[derive(Debug)]
pub struct StateStores {
    pub skip_list: SkipList,
    pub cooldown: CooldownList,
    pub trending: TrendingCache,
}

impl StateStores {
    /// Loads all stores from the configured state directory.
    pub fn open(settings: &StoreSettings, now: DateTime<Utc>) -> Self {
        tracing::debug!(state_dir = %settings.state_dir.display(), "Loading state stores.");
        Self {
            skip_list: SkipList::load(settings.skip_list_path(), settings.skip_days, now),
            cooldown: CooldownList::load(settings.cooldown_path(), settings.signal_cooldown_hours, now),
            trending: TrendingCache::load(settings.trending_cache_path(), settings.cache_ttl_hours),
        }
    }

    /// Which store, if any, keeps `symbol` out of a scan at `now`.
    pub fn exclusion(&self, symbol: &Symbol, now: DateTime<Utc>) -> Option<Exclusion> {
        if self.cooldown.is_active(symbol, now) {
            Some(Exclusion::CoolingDown)
        } else if self.skip_list.is_active(symbol, now) {
            Some(Exclusion::Skipped)
        } else {
            None
        }
    }

    /// Clears the trending cache and the skip-list. Cooldowns are left alone.
    pub fn reset(&mut self) {
        self.trending.clear();
        self.skip_list.clear();
    }

    /// Flushes every dirty store. All stores are attempted; the first error is returned.
    pub fn flush(&mut self) -> Result<()> {
        let results = [
            self.skip_list.flush(),
            self.cooldown.flush(),
            self.trending.flush(),
        ];
        let mut first_error = None;
        for result in results {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to persist state store.");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
