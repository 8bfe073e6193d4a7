// In crates/analytics/src/types.rs

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A derived series aligned with its source `PriceSeries`.
///
/// `None` marks "not enough history yet"; it is never coerced to zero.
pub type Series = Vec<Option<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Parameters for the secondary indicators shown alongside a crossover.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    /// Number of population standard deviations between the middle and outer bands.
    pub bollinger_multiplier: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_window: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_window: 20,
            bollinger_multiplier: 2.0,
        }
    }
}

impl IndicatorSettings {
    /// Checks every parameter up front, so a bad value fails before any
    /// series is computed.
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("rsi", self.rsi_window),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger", self.bollinger_window),
        ];
        if let Some(&(indicator, window)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(Error::InvalidWindow { indicator, window });
        }
        if !self.bollinger_multiplier.is_finite() || self.bollinger_multiplier <= 0.0 {
            return Err(Error::InvalidMultiplier(self.bollinger_multiplier));
        }
        Ok(())
    }
}

/// Every indicator computed for one `PriceSeries`, index-aligned with its bars.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub short_window: usize,
    pub long_window: usize,
    pub sma_short: Series,
    pub sma_long: Series,
    pub rsi: Series,
    pub macd: Vec<MacdPoint>,
    pub bollinger: Vec<Option<BollingerPoint>>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Index of the most recent bar where both moving averages are defined.
    pub fn last_complete_index(&self) -> Option<usize> {
        (0..self.len())
            .rev()
            .find(|&i| self.sma_short[i].is_some() && self.sma_long[i].is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(IndicatorSettings::default().validate(), Ok(()));
    }

    #[test]
    fn zero_window_or_bad_multiplier_is_rejected() {
        let zero_rsi = IndicatorSettings {
            rsi_window: 0,
            ..Default::default()
        };
        assert_eq!(
            zero_rsi.validate(),
            Err(Error::InvalidWindow {
                indicator: "rsi",
                window: 0
            })
        );

        let zero_signal = IndicatorSettings {
            macd_signal: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_signal.validate(),
            Err(Error::InvalidWindow { indicator: "macd_signal", .. })
        ));

        let nan_bands = IndicatorSettings {
            bollinger_multiplier: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(nan_bands.validate(), Err(Error::InvalidMultiplier(_))));
    }
}
