// In crates/state-store/src/types.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SKIP_LIST_FILE: &str = "skip_list.json";
pub const COOLDOWN_FILE: &str = "cooldown.json";
pub const TRENDING_CACHE_FILE: &str = "trending_cache.json";

/// Where the stores live and how long their entries stay in force.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory holding the three JSON state files.
    pub state_dir: PathBuf,
    /// Days a symbol stays on the skip-list after an uninteresting scan.
    pub skip_days: u32,
    /// Hours a discovered trending set is reused before discovery runs again.
    pub cache_ttl_hours: u32,
    /// Hours of automatic cooldown after a symbol produced a signal.
    pub signal_cooldown_hours: u32,
    /// Days of cooldown after the user reports selling a symbol.
    pub sold_cooldown_days: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("state"),
            skip_days: 7,
            cache_ttl_hours: 6,
            signal_cooldown_hours: 24,
            sold_cooldown_days: 2,
        }
    }
}

impl StoreSettings {
    pub fn skip_list_path(&self) -> PathBuf {
        self.state_dir.join(SKIP_LIST_FILE)
    }

    pub fn cooldown_path(&self) -> PathBuf {
        self.state_dir.join(COOLDOWN_FILE)
    }

    pub fn trending_cache_path(&self) -> PathBuf {
        self.state_dir.join(TRENDING_CACHE_FILE)
    }
}

/// Why a symbol was put on the skip-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The provider failed or returned an empty series.
    NoData,
    /// The series was analysed but produced no qualifying crossover.
    NoSignal,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData => write!(f, "no data"),
            Self::NoSignal => write!(f, "no signal"),
        }
    }
}

/// Which store is currently keeping a symbol out of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Skipped,
    CoolingDown,
}
