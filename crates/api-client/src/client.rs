// In crates/api-client/src/client.rs

use crate::{Error, Result};
use app_config::ProviderSettings;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the public Yahoo Finance JSON endpoints.
///
/// Implements both `PriceHistoryProvider` (see `chart.rs`) and
/// `SymbolDiscoverer` (see `discovery.rs`).
#[derive(Debug, Clone)]
pub struct YahooClient {
    /// The persistent HTTP client.
    pub(crate) http_client: Client,
    pub(crate) settings: ProviderSettings,
}

impl YahooClient {
    /// Constructs a new YahooClient from ProviderSettings.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(Self {
            http_client,
            settings: settings.clone(),
        })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Issues a GET and decodes the JSON body.
    ///
    /// Yahoo reports many failures as a JSON error object with a non-2xx
    /// status, so the body is decoded first and the status only decides the
    /// error when the body is not the expected shape.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        tracing::debug!(url, "Requesting Yahoo Finance endpoint.");

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::RequestFailed)?;

        match serde_json::from_str::<T>(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }),
            Err(e) => Err(Error::DeserializationFailed(e)),
        }
    }
}
