// In crates/analytics/src/engine.rs

use crate::types::{BollingerPoint, IndicatorSet, IndicatorSettings, MacdPoint, Series};
use crate::{Error, Result};
use core_types::PriceSeries;
use ta::Next;
use ta::indicators::{
    BollingerBands, ExponentialMovingAverage as Ema, SimpleMovingAverage as Sma,
};

/// The engine responsible for computing indicator series from a price history.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    settings: IndicatorSettings,
}

impl IndicatorEngine {
    pub fn new(settings: IndicatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    /// Calculates the full indicator set for a series.
    ///
    /// `short_window` and `long_window` are the two moving averages the
    /// crossover detector compares.
    pub fn calculate(
        &self,
        series: &PriceSeries,
        short_window: usize,
        long_window: usize,
    ) -> Result<IndicatorSet> {
        let closes = series.closes();
        let s = &self.settings;

        Ok(IndicatorSet {
            dates: series.dates(),
            short_window,
            long_window,
            sma_short: sma(&closes, short_window)?,
            sma_long: sma(&closes, long_window)?,
            rsi: rsi(&closes, s.rsi_window)?,
            macd: macd(&closes, s.macd_fast, s.macd_slow, s.macd_signal)?,
            bollinger: bollinger(&closes, s.bollinger_window, s.bollinger_multiplier)?,
            closes,
        })
    }
}

fn check_window(indicator: &'static str, window: usize) -> Result<()> {
    if window == 0 {
        return Err(Error::InvalidWindow { indicator, window });
    }
    Ok(())
}

/// Simple moving average. Defined only from index `window - 1` onwards.
pub fn sma(closes: &[f64], window: usize) -> Result<Series> {
    check_window("sma", window)?;
    let mut indicator = Sma::new(window).map_err(|_| Error::InvalidWindow {
        indicator: "sma",
        window,
    })?;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            // The indicator averages a partial window during warm-up; keep its
            // state moving but hide those values.
            let value = indicator.next(*close);
            (i + 1 >= window).then_some(value)
        })
        .collect())
}

/// RSI over simple rolling averages of gains and losses.
///
/// Defined from index `window` (the first bar with `window` price changes
/// behind it). A window without any loss yields exactly 100.
pub fn rsi(closes: &[f64], window: usize) -> Result<Series> {
    check_window("rsi", window)?;
    let mut out = vec![None; closes.len()];
    if closes.len() <= window {
        return Ok(out);
    }

    // deltas[k] is the change into bar k + 1.
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let w = window as f64;

    for (i, slot) in out.iter_mut().enumerate().skip(window) {
        let recent = &deltas[i - window..i];
        let avg_gain = recent.iter().map(|d| d.max(0.0)).sum::<f64>() / w;
        let avg_loss = recent.iter().map(|d| (-d).max(0.0)).sum::<f64>() / w;

        *slot = Some(if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        });
    }
    Ok(out)
}

/// Exponential moving average seeded with the first value, α = 2 / (span + 1).
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    check_window("ema", span)?;
    let mut indicator = Ema::new(span).map_err(|_| Error::InvalidWindow {
        indicator: "ema",
        window: span,
    })?;
    Ok(values.iter().map(|v| indicator.next(*v)).collect())
}

/// MACD line, its signal line and the histogram between them.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Result<Vec<MacdPoint>> {
    let fast_line = ema(closes, fast)?;
    let slow_line = ema(closes, slow)?;
    let macd_line: Vec<f64> = fast_line
        .iter()
        .zip(&slow_line)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&macd_line, signal)?;

    Ok(macd_line
        .into_iter()
        .zip(signal_line)
        .map(|(macd, signal)| MacdPoint {
            macd,
            signal,
            histogram: macd - signal,
        })
        .collect())
}

/// Bollinger Bands using the population standard deviation of the window.
pub fn bollinger(
    closes: &[f64],
    window: usize,
    multiplier: f64,
) -> Result<Vec<Option<BollingerPoint>>> {
    check_window("bollinger", window)?;
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(Error::InvalidMultiplier(multiplier));
    }
    let mut bands = BollingerBands::new(window, multiplier).map_err(|_| Error::InvalidWindow {
        indicator: "bollinger",
        window,
    })?;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let out = bands.next(*close);
            (i + 1 >= window).then_some(BollingerPoint {
                upper: out.upper,
                middle: out.average,
                lower: out.lower,
            })
        })
        .collect())
}
