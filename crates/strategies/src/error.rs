// In crates/strategies/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Long window ({long}) must be greater than short window ({short}), and both non-zero")]
    InvalidWindows { short: usize, long: usize },

    #[error("Indicator calculation failed: {0}")]
    Indicator(#[from] analytics::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
