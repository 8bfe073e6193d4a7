// In crates/strategies/src/types.rs

use core_types::{CrossoverEvent, CrossoverKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverSettings {
    /// Window of the fast moving average (e.g., 50 days).
    pub short_window: usize,
    /// Window of the slow moving average (e.g., 200 days).
    pub long_window: usize,
}

impl Default for CrossoverSettings {
    fn default() -> Self {
        Self {
            short_window: 50,
            long_window: 200,
        }
    }
}

/// Which detected events make a symbol "interesting" enough to stay off the skip-list.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignalPolicy {
    /// Any golden or death cross counts.
    #[default]
    AnyCross,
    /// Only golden crosses count; a death-cross-only result is treated as no signal.
    GoldenOnly,
}

impl SignalPolicy {
    pub fn accepts(&self, kind: CrossoverKind) -> bool {
        match self {
            Self::AnyCross => true,
            Self::GoldenOnly => kind == CrossoverKind::GoldenCross,
        }
    }

    /// The subset of `events` this policy treats as actionable, order preserved.
    pub fn actionable(&self, events: &[CrossoverEvent]) -> Vec<CrossoverEvent> {
        events
            .iter()
            .filter(|e| self.accepts(e.kind))
            .cloned()
            .collect()
    }
}
