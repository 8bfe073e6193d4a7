// In crates/app-config/src/types.rs

use serde::Deserialize;

use analytics::IndicatorSettings;
use state_store::StoreSettings;
use strategies::{CrossoverSettings, SignalPolicy};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// How a scan session selects, batches and judges symbols.
    #[serde(default)]
    pub scan: ScanSettings,
    /// Location and expiry policy of the persistent symbol stores.
    #[serde(default)]
    pub state: StoreSettings,
    /// Yahoo Finance endpoints used for price history and discovery.
    #[serde(default)]
    pub provider: ProviderSettings,
    /// Parameters of the secondary indicators (RSI, MACD, Bollinger).
    #[serde(default)]
    pub indicators: IndicatorSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScanSettings {
    /// Window of the fast moving average.
    pub short_window: usize,
    /// Window of the slow moving average.
    pub long_window: usize,
    /// Number of symbols processed between continuation prompts.
    pub batch_size: usize,
    /// Pause between consecutive price-history requests, in milliseconds.
    pub request_delay_ms: u64,
    /// Only crossovers this many days old or newer count as signals.
    pub recency_days: u32,
    /// History fetched when no start date is given, in calendar days.
    pub lookback_days: u32,
    /// Shuffle the candidate list before batching.
    pub shuffle: bool,
    /// Fixed seed for the shuffle; a random one is drawn when absent.
    pub shuffle_seed: Option<u64>,
    pub signal_policy: SignalPolicy,
    /// Put symbols that produced a signal into the hours-based cooldown.
    pub cooldown_after_signal: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        let crossover = CrossoverSettings::default();
        Self {
            short_window: crossover.short_window,
            long_window: crossover.long_window,
            batch_size: 10,
            request_delay_ms: 1000,
            recency_days: 30,
            lookback_days: 400,
            shuffle: true,
            shuffle_seed: None,
            signal_policy: SignalPolicy::default(),
            cooldown_after_signal: true,
        }
    }
}

impl ScanSettings {
    pub fn crossover(&self) -> CrossoverSettings {
        CrossoverSettings {
            short_window: self.short_window,
            long_window: self.long_window,
        }
    }
}

/// A Yahoo Finance list that discovery draws symbols from.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryCategory {
    Trending,
    MostActive,
    Gainers,
    Losers,
}

impl DiscoveryCategory {
    pub const ALL: [DiscoveryCategory; 4] = [
        Self::MostActive,
        Self::Trending,
        Self::Gainers,
        Self::Losers,
    ];

    /// The predefined screener backing this category, if it is screener based.
    pub fn screener_id(&self) -> Option<&'static str> {
        match self {
            Self::Trending => None,
            Self::MostActive => Some("most_actives"),
            Self::Gainers => Some("day_gainers"),
            Self::Losers => Some("day_losers"),
        }
    }
}

impl std::fmt::Display for DiscoveryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Trending => "trending",
            Self::MostActive => "most_active",
            Self::Gainers => "gainers",
            Self::Losers => "losers",
        };
        f.write_str(name)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the chart (price history) API.
    pub chart_base_url: String,
    /// Base URL of the trending and screener APIs.
    pub discovery_base_url: String,
    /// Region passed to the trending endpoint (e.g., "US").
    pub region: String,
    /// Yahoo rejects requests without a browser-like agent.
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Number of symbols requested from each screener.
    pub screener_count: u32,
    pub categories: Vec<DiscoveryCategory>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            chart_base_url: "https://query1.finance.yahoo.com".to_string(),
            discovery_base_url: "https://query1.finance.yahoo.com".to_string(),
            region: "US".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            timeout_secs: 15,
            screener_count: 25,
            categories: DiscoveryCategory::ALL.to_vec(),
        }
    }
}
