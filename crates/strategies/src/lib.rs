// In crates/strategies/src/lib.rs

use analytics::IndicatorSet;
use core_types::{CrossoverEvent, Symbol};

pub mod error;
pub mod ma_crossover;
pub mod types;

pub use error::{Error, Result};
pub use ma_crossover::{MACrossover, detect_crossovers, filter_recent};
pub use types::{CrossoverSettings, SignalPolicy};

/// The universal interface for a signal-detection strategy.
///
/// A strategy reads an already computed, date-aligned `IndicatorSet` and
/// reports every crossover it finds, in ascending date order. It never
/// mutates the indicators it is given.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// The (short, long) moving-average windows this strategy compares.
    fn windows(&self) -> (usize, usize);

    fn assess(&self, symbol: &Symbol, indicators: &IndicatorSet) -> Vec<CrossoverEvent>;
}
