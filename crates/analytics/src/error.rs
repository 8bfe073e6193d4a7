// In crates/analytics/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid window for {indicator}: {window}")]
    InvalidWindow { indicator: &'static str, window: usize },

    #[error("Invalid Bollinger band multiplier: {0}")]
    InvalidMultiplier(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
