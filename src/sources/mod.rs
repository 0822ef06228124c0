//! Remote Data Sources
//!
//! Everything the page build reads from the network goes through the
//! [`DataSource`] trait:
//!
//! - protocol list with chain membership and extra-TVL keys
//! - per-chain daily TVL series
//! - chain -> market-cap id configuration
//! - market caps by id
//!
//! [`HttpDataSource`] talks to the real APIs; [`StaticDataSource`] serves a
//! fixed snapshot (fixtures, offline runs, tests).

mod client;
mod types;

pub use client::{HttpDataSource, HttpSourceConfig};
pub use types::ProtocolsSnapshot;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::aggregate::{ChainMetadata, ChainTimeSeries};

/// Provider of the raw inputs of a page build
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Chain list and protocol listings
    async fn protocols(&self) -> Result<ProtocolsSnapshot, SourceError>;

    /// Daily TVL history of one chain
    async fn chain_series(&self, chain: &str) -> Result<ChainTimeSeries, SourceError>;

    /// Chain name -> market-cap id and symbol
    async fn chain_metadata(&self) -> Result<BTreeMap<String, ChainMetadata>, SourceError>;

    /// Market cap in USD keyed by market-cap id
    async fn market_caps(&self, ids: &[String]) -> Result<BTreeMap<String, f64>, SourceError>;
}

/// Errors raised while fetching source data
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("API error {status} from {url}: {message}")]
    ApiError {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Failed to decode response from {url}: {error}")]
    Decode { url: String, error: String },

    #[error("No series for chain: {0}")]
    MissingChain(String),

    #[error("Failed to load snapshot {path}: {error}")]
    Snapshot { path: String, error: String },
}

/// In-memory snapshot of every source response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticDataSource {
    pub protocols: ProtocolsSnapshot,
    pub series: BTreeMap<String, ChainTimeSeries>,
    pub metadata: BTreeMap<String, ChainMetadata>,
    pub market_caps: BTreeMap<String, f64>,
}

impl StaticDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain and its series
    pub fn with_series(mut self, series: ChainTimeSeries) -> Self {
        if !self.protocols.chains.contains(&series.chain) {
            self.protocols.chains.push(series.chain.clone());
        }
        self.series.insert(series.chain.clone(), series);
        self
    }

    pub fn with_protocol(mut self, protocol: crate::aggregate::ProtocolListing) -> Self {
        self.protocols.protocols.push(protocol);
        self
    }

    pub fn with_metadata(mut self, chain: &str, gecko_id: Option<&str>, symbol: Option<&str>) -> Self {
        self.metadata.insert(
            chain.to_string(),
            ChainMetadata {
                gecko_id: gecko_id.map(str::to_string),
                symbol: symbol.map(str::to_string),
            },
        );
        self
    }

    pub fn with_market_cap(mut self, gecko_id: &str, mcap: f64) -> Self {
        self.market_caps.insert(gecko_id.to_string(), mcap);
        self
    }

    /// Load a snapshot previously written with [`StaticDataSource::save`]
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let snapshot_err = |error: String| SourceError::Snapshot {
            path: path.display().to_string(),
            error,
        };
        let content = std::fs::read_to_string(path).map_err(|e| snapshot_err(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| snapshot_err(e.to_string()))
    }

    /// Write the snapshot as JSON
    pub fn save(&self, path: &Path) -> Result<(), SourceError> {
        let snapshot_err = |error: String| SourceError::Snapshot {
            path: path.display().to_string(),
            error,
        };
        let content = serde_json::to_string_pretty(self).map_err(|e| snapshot_err(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| snapshot_err(e.to_string()))
    }

    /// Fetch everything `source` serves into a snapshot
    pub async fn capture(source: &dyn DataSource) -> Result<Self, SourceError> {
        let (protocols, metadata) = tokio::try_join!(source.protocols(), source.chain_metadata())?;

        let mut ids: Vec<String> = metadata.values().filter_map(|m| m.gecko_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let series_calls = try_join_all(protocols.chains.iter().map(|chain| source.chain_series(chain)));
        let (series, market_caps) = tokio::try_join!(series_calls, source.market_caps(&ids))?;

        tracing::info!(
            source = source.name(),
            chains = series.len(),
            "Captured snapshot"
        );

        Ok(Self {
            protocols,
            series: series.into_iter().map(|s| (s.chain.clone(), s)).collect(),
            metadata,
            market_caps,
        })
    }
}

#[async_trait]
impl DataSource for StaticDataSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn protocols(&self) -> Result<ProtocolsSnapshot, SourceError> {
        Ok(self.protocols.clone())
    }

    async fn chain_series(&self, chain: &str) -> Result<ChainTimeSeries, SourceError> {
        self.series
            .get(chain)
            .cloned()
            .ok_or_else(|| SourceError::MissingChain(chain.to_string()))
    }

    async fn chain_metadata(&self) -> Result<BTreeMap<String, ChainMetadata>, SourceError> {
        Ok(self.metadata.clone())
    }

    async fn market_caps(&self, ids: &[String]) -> Result<BTreeMap<String, f64>, SourceError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.market_caps.get(id).map(|mcap| (id.clone(), *mcap)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> StaticDataSource {
        StaticDataSource::new()
            .with_series(ChainTimeSeries::from_pairs("Ethereum", &[(1, 1.0)]))
            .with_metadata("Ethereum", Some("ethereum"), Some("ETH"))
            .with_market_cap("ethereum", 10.0)
    }

    #[tokio::test]
    async fn test_static_source_serves_snapshot() {
        let source = sample();

        let protocols = source.protocols().await.unwrap();
        assert_eq!(protocols.chains, vec!["Ethereum"]);

        let series = source.chain_series("Ethereum").await.unwrap();
        assert_eq!(series.latest(), Some(1.0));

        let caps = source
            .market_caps(&["ethereum".to_string(), "unknown".to_string()])
            .await
            .unwrap();
        assert_eq!(caps.len(), 1);
    }

    #[tokio::test]
    async fn test_static_source_missing_chain() {
        let err = sample().chain_series("Solana").await.unwrap_err();
        assert!(matches!(err, SourceError::MissingChain(ref c) if c == "Solana"));
    }

    #[tokio::test]
    async fn test_snapshot_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        sample().save(&path).unwrap();
        let loaded = StaticDataSource::load(&path).unwrap();

        assert_eq!(loaded.metadata["Ethereum"].gecko_id.as_deref(), Some("ethereum"));
        assert_eq!(loaded.chain_series("Ethereum").await.unwrap().points.len(), 1);
    }

    #[tokio::test]
    async fn test_capture_copies_source() {
        let source = sample().with_series(ChainTimeSeries::from_pairs("BSC", &[(1, 2.0), (2, 3.0)]));

        let captured = StaticDataSource::capture(&source).await.unwrap();
        assert_eq!(captured.protocols.chains, vec!["Ethereum", "BSC"]);
        assert_eq!(captured.series["BSC"].points.len(), 2);
        assert_eq!(captured.market_caps["ethereum"], 10.0);
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::MissingChain("BSC".to_string());
        assert_eq!(err.to_string(), "No series for chain: BSC");
    }
}
