// In crates/core-types/src/error.rs

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid date range: end {end} must be after start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Could not parse date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Price bars for {symbol} are not strictly ordered by date at {date}")]
    UnorderedBars { symbol: String, date: NaiveDate },

    #[error("Symbol must not be empty")]
    EmptySymbol,
}

pub type Result<T> = std::result::Result<T, Error>;
