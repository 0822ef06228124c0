//! HTTP Data Source
//!
//! reqwest client for the TVL API (protocols, per-chain charts, chain
//! config) and the CoinGecko market-cap lookup.
//!
//! Requests are made once; failures are returned to the caller without
//! retrying.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};

use super::types::{
    market_caps_from, ChainChartResponse, ChainConfigResponse, ProtocolsResponse,
    ProtocolsSnapshot, SimplePrice,
};
use super::{DataSource, SourceError};
use crate::aggregate::{ChainMetadata, ChainTimeSeries};

/// Endpoints and limits for [`HttpDataSource`]
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Protocol list with chain membership
    pub protocols_url: String,
    /// Base URL of per-chain TVL charts; the chain name is appended
    pub chart_url: String,
    /// Chain -> market-cap id configuration
    pub config_url: String,
    /// CoinGecko API base URL
    pub coingecko_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            protocols_url: "https://api.llama.fi/lite/protocols2".to_string(),
            chart_url: "https://api.llama.fi/lite/charts".to_string(),
            config_url: "https://api.llama.fi/config".to_string(),
            coingecko_url: "https://api.coingecko.com/api/v3".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

/// [`DataSource`] backed by the public HTTP APIs
pub struct HttpDataSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpDataSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// URL of a chain's TVL chart
    fn chart_endpoint(&self, chain: &str) -> String {
        format!(
            "{}/{}",
            self.config.chart_url.trim_end_matches('/'),
            urlencoding::encode(chain)
        )
    }

    /// URL of the market-cap lookup for `ids`
    fn market_cap_endpoint(&self, ids: &[String]) -> String {
        let joined = ids.join(",");
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_market_cap=true",
            self.config.coingecko_url.trim_end_matches('/'),
            urlencoding::encode(&joined)
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        tracing::debug!(url = %url, "Fetching");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(url.to_string())
            } else {
                SourceError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SourceError::ApiError {
                url: url.to_string(),
                status: status.as_u16(),
                message: text,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode {
            url: url.to_string(),
            error: e.to_string(),
        })
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn protocols(&self) -> Result<ProtocolsSnapshot, SourceError> {
        let resp: ProtocolsResponse = self.get_json(&self.config.protocols_url).await?;
        Ok(resp.into())
    }

    async fn chain_series(&self, chain: &str) -> Result<ChainTimeSeries, SourceError> {
        let resp: ChainChartResponse = self.get_json(&self.chart_endpoint(chain)).await?;
        Ok(resp.into_series(chain))
    }

    async fn chain_metadata(&self) -> Result<BTreeMap<String, ChainMetadata>, SourceError> {
        let resp: ChainConfigResponse = self.get_json(&self.config.config_url).await?;
        Ok(resp.into_metadata())
    }

    async fn market_caps(&self, ids: &[String]) -> Result<BTreeMap<String, f64>, SourceError> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }
        let prices: HashMap<String, SimplePrice> =
            self.get_json(&self.market_cap_endpoint(ids)).await?;
        Ok(market_caps_from(prices))
    }
}
