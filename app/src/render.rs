// In app/src/render.rs

use anyhow::{Context, Result};
use engine::{ChartRenderer, ScanReport, SymbolAnalysis, SymbolStatus};
use std::path::PathBuf;

/// Number of trailing bars shown in the console table.
const CONSOLE_ROWS: usize = 5;

/// Prints the latest indicator values of a signalling symbol.
#[derive(Debug, Default)]
pub struct ConsoleRenderer;

impl ChartRenderer for ConsoleRenderer {
    fn name(&self) -> &'static str {
        "console"
    }

    fn render(&mut self, analysis: &SymbolAnalysis) -> Result<()> {
        let ind = &analysis.indicators;
        println!("\n=== {} ===", analysis.symbol());
        for event in &analysis.signals {
            println!("  {} on {}", event.kind, event.date);
        }

        println!(
            "  {:<10} {:>10} {:>10} {:>10} {:>7} {:>9} {:>10} {:>10}",
            "date",
            "close",
            format!("sma{}", ind.short_window),
            format!("sma{}", ind.long_window),
            "rsi",
            "macd_hist",
            "bb_upper",
            "bb_lower"
        );
        let from = ind.len().saturating_sub(CONSOLE_ROWS);
        for i in from..ind.len() {
            let band = ind.bollinger[i];
            println!(
                "  {:<10} {:>10.2} {:>10} {:>10} {:>7} {:>9.3} {:>10} {:>10}",
                ind.dates[i],
                ind.closes[i],
                fmt_opt(ind.sma_short[i], 2),
                fmt_opt(ind.sma_long[i], 2),
                fmt_opt(ind.rsi[i], 1),
                ind.macd[i].histogram,
                fmt_opt(band.map(|b| b.upper), 2),
                fmt_opt(band.map(|b| b.lower), 2),
            );
        }
        Ok(())
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

/// Writes each analysis as `<SYMBOL>_<last date>.json` for external charting.
#[derive(Debug)]
pub struct JsonExportRenderer {
    dir: PathBuf,
}

impl JsonExportRenderer {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
        Ok(Self { dir })
    }
}

impl ChartRenderer for JsonExportRenderer {
    fn name(&self) -> &'static str {
        "json-export"
    }

    fn render(&mut self, analysis: &SymbolAnalysis) -> Result<()> {
        let stamp = analysis
            .series
            .last_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "empty".to_string());
        let path = self.dir.join(format!("{}_{}.json", analysis.symbol(), stamp));
        let body = serde_json::to_string_pretty(analysis)?;
        std::fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(symbol = %analysis.symbol(), path = %path.display(), "Exported analysis.");
        Ok(())
    }
}

/// Fans each analysis out to several renderers. Every renderer runs even if
/// an earlier one fails; the first failure is returned.
#[derive(Default)]
pub struct RendererSet {
    renderers: Vec<Box<dyn ChartRenderer>>,
}

impl RendererSet {
    pub fn with(mut self, renderer: impl ChartRenderer + 'static) -> Self {
        self.renderers.push(Box::new(renderer));
        self
    }
}

impl ChartRenderer for RendererSet {
    fn name(&self) -> &'static str {
        "renderer-set"
    }

    fn render(&mut self, analysis: &SymbolAnalysis) -> Result<()> {
        let mut first_error = None;
        for renderer in &mut self.renderers {
            if let Err(e) = renderer.render(analysis) {
                first_error.get_or_insert(e.context(format!("{} renderer failed", renderer.name())));
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Prints the end-of-session summary.
pub fn print_scan_report(report: &ScanReport) {
    println!("\n--- Scan Complete ---");
    println!("History window: {}", report.range);
    println!(
        "Candidates: {} | Excluded by state: {} | Scanned: {}{}",
        report.candidates,
        report.excluded,
        report.processed(),
        if report.stopped_early { " (stopped early)" } else { "" }
    );

    let no_data = report
        .symbols()
        .filter(|s| matches!(s.status, SymbolStatus::NoData(_)))
        .count();
    let signals: Vec<_> = report.signals().collect();
    println!("Signals: {} | No data: {}", signals.len(), no_data);

    for symbol in signals {
        let close = symbol
            .last_close
            .map(|c| format!("{c:.2}"))
            .unwrap_or_else(|| "-".to_string());
        for event in &symbol.signals {
            println!("  {:<8} {:<13} {}  last close {}", symbol.symbol, event.kind, event.date, close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::IndicatorEngine;
    use chrono::{Duration, NaiveDate};
    use core_types::{CrossoverEvent, CrossoverKind, PriceBar, PriceSeries, Symbol};
    use rust_decimal::Decimal;

    fn analysis() -> SymbolAnalysis {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let bars = (0..30)
            .map(|i| {
                let close = Decimal::from(100 + i);
                PriceBar {
                    date: start + Duration::days(i),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: Decimal::ONE,
                }
            })
            .collect();
        let series = PriceSeries::new(Symbol::new("ACME").unwrap(), bars).unwrap();
        let indicators = IndicatorEngine::default().calculate(&series, 3, 10).unwrap();
        let event = CrossoverEvent {
            symbol: series.symbol().clone(),
            date: start + Duration::days(20),
            kind: CrossoverKind::GoldenCross,
        };
        SymbolAnalysis {
            series,
            indicators,
            events: vec![event.clone()],
            signals: vec![event],
        }
    }

    struct Failing;

    impl ChartRenderer for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn render(&mut self, _: &SymbolAnalysis) -> Result<()> {
            anyhow::bail!("boom")
        }
    }

    #[test]
    fn json_export_writes_one_file_per_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = JsonExportRenderer::new(dir.path().join("out")).unwrap();

        renderer.render(&analysis()).unwrap();

        let path = dir.path().join("out").join("ACME_2024-03-30.json");
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["signals"][0]["kind"], "GoldenCross");
        assert_eq!(written["indicators"]["closes"].as_array().unwrap().len(), 30);
    }

    #[test]
    fn renderer_set_runs_everything_and_reports_the_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = RendererSet::default()
            .with(Failing)
            .with(JsonExportRenderer::new(dir.path().to_path_buf()).unwrap());

        assert!(set.render(&analysis()).is_err());
        assert!(dir.path().join("ACME_2024-03-30.json").exists());
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(fmt_opt(None, 2), "-");
        assert_eq!(fmt_opt(Some(1.23456), 2), "1.23");
    }
}
