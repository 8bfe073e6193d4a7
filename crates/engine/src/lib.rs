// In crates/engine/src/lib.rs

pub mod error;
pub mod scanner;
pub mod types;

pub use error::{Error, Result};
pub use scanner::Scanner;
pub use types::{
    BatchReport, HistoryWindow, ScanReport, ScanRequest, SymbolAnalysis, SymbolReport,
    SymbolStatus,
};

/// Decides at each batch boundary whether the session goes on.
///
/// Called only when at least one more batch is pending, after the completed
/// batch has been flushed to disk.
pub trait BatchControl {
    fn continue_after(&mut self, completed: &BatchReport, remaining: usize) -> bool;
}

/// Runs every batch without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunAll;

impl BatchControl for RunAll {
    fn continue_after(&mut self, _: &BatchReport, _: usize) -> bool {
        true
    }
}

/// Presents a symbol that produced a signal.
///
/// Renderers only read the analysis. A failing renderer is logged and does
/// not affect the symbol's outcome.
pub trait ChartRenderer {
    fn name(&self) -> &'static str;

    fn render(&mut self, analysis: &SymbolAnalysis) -> anyhow::Result<()>;
}
