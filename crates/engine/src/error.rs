// In crates/engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No symbols left to scan after filtering")]
    NoCandidates,

    #[error("Symbol discovery is unavailable and no fresh cache exists: {0}")]
    DiscoveryUnavailable(#[source] api_client::Error),

    #[error("Invalid history window: {0}")]
    InvalidRange(#[from] core_types::Error),

    #[error("Invalid scan settings: {0}")]
    InvalidSettings(String),

    #[error("Strategy setup failed: {0}")]
    Strategy(#[from] strategies::Error),

    #[error("Indicator calculation failed: {0}")]
    Indicator(#[from] analytics::Error),

    #[error("Failed to persist scan state: {0}")]
    State(#[from] state_store::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
