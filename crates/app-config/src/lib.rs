// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, DiscoveryCategory, ProviderSettings, ScanSettings, Settings};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new("config"))
}

/// Same as [`load_settings`], reading the TOML files from `config_dir`.
pub fn load_settings_from(config_dir: &Path) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::from(config_dir.join("base")))
        // 2. Load the environment-specific configuration file.
        .add_source(File::from(config_dir.join(&environment)).required(false))
        // 3. Load settings from environment variables (e.g., `APP_SCAN__BATCH_SIZE=5`).
        // The prefix is `APP`, separator is `__`.
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    validate(&settings)?;

    Ok(settings)
}

/// Upper bound for `scan.lookback_days` and `scan.recency_days`.
pub const MAX_HISTORY_DAYS: u32 = 36_500;
/// Upper bound for a sold cooldown, whether configured or given on the command line.
pub const MAX_COOLDOWN_DAYS: u32 = 3_650;
/// Upper bound for `state.signal_cooldown_hours`.
pub const MAX_COOLDOWN_HOURS: u32 = MAX_COOLDOWN_DAYS * 24;

/// Rejects combinations the scanner cannot run with.
pub fn validate(settings: &Settings) -> Result<()> {
    let scan = &settings.scan;
    if scan.batch_size == 0 {
        return Err(Error::Invalid("scan.batch_size must be at least 1".into()));
    }
    if scan.short_window == 0 || scan.long_window <= scan.short_window {
        return Err(Error::Invalid(format!(
            "scan.long_window ({}) must be greater than scan.short_window ({}), and both non-zero",
            scan.long_window, scan.short_window
        )));
    }
    for (name, days) in [
        ("scan.lookback_days", scan.lookback_days),
        ("scan.recency_days", scan.recency_days),
    ] {
        if days > MAX_HISTORY_DAYS {
            return Err(Error::Invalid(format!("{name} ({days}) must be at most {MAX_HISTORY_DAYS}")));
        }
    }
    settings
        .indicators
        .validate()
        .map_err(|e| Error::Invalid(format!("indicators: {e}")))?;
    if settings.provider.categories.is_empty() {
        return Err(Error::Invalid("provider.categories must name at least one category".into()));
    }
    if settings.state.skip_days == 0 {
        return Err(Error::Invalid("state.skip_days must be at least 1".into()));
    }
    if settings.state.sold_cooldown_days > MAX_COOLDOWN_DAYS {
        return Err(Error::Invalid(format!(
            "state.sold_cooldown_days must be at most {MAX_COOLDOWN_DAYS}"
        )));
    }
    if settings.state.signal_cooldown_hours > MAX_COOLDOWN_HOURS {
        return Err(Error::Invalid(format!(
            "state.signal_cooldown_hours must be at most {MAX_COOLDOWN_HOURS}"
        )));
    }
    Ok(())
}
