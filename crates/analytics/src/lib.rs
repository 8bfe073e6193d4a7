// In crates/analytics/src/lib.rs

pub mod engine;
pub mod error;
pub mod types;

// Re-export public types
pub use engine::{IndicatorEngine, bollinger, ema, macd, rsi, sma};
pub use error::{Error, Result};
pub use types::{BollingerPoint, IndicatorSet, IndicatorSettings, MacdPoint, Series};
