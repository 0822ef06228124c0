//! Wire types for the TVL and market-cap APIs
//!
//! Responses are decoded leniently: timestamps may be numbers or numeric
//! strings, and null TVL entries are dropped.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::aggregate::{ChainMetadata, ChainTimeSeries, ProtocolListing, TvlPoint};

/// Chain list plus every protocol's chain membership
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProtocolsSnapshot {
    pub chains: Vec<String>,
    pub protocols: Vec<ProtocolListing>,
}

/// `GET {protocols_url}`
#[derive(Debug, Deserialize)]
pub(crate) struct ProtocolsResponse {
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub protocols: Vec<ProtocolEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProtocolEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default, rename = "chainTvls")]
    pub chain_tvls: HashMap<String, Option<f64>>,
}

impl From<ProtocolsResponse> for ProtocolsSnapshot {
    fn from(resp: ProtocolsResponse) -> Self {
        let protocols = resp
            .protocols
            .into_iter()
            .map(|p| ProtocolListing {
                name: p.name,
                chains: p.chains,
                chain_tvls: p
                    .chain_tvls
                    .into_iter()
                    .filter_map(|(k, v)| v.map(|v| (k, v)))
                    .collect(),
            })
            .collect();

        Self {
            chains: resp.chains,
            protocols,
        }
    }
}

/// `GET {chart_url}/{chain}`
#[derive(Debug, Deserialize)]
pub(crate) struct ChainChartResponse {
    #[serde(default)]
    pub tvl: Vec<(Timestamp, Option<f64>)>,
}

impl ChainChartResponse {
    pub fn into_series(self, chain: &str) -> ChainTimeSeries {
        let points = self
            .tvl
            .into_iter()
            .filter_map(|(ts, value)| Some(TvlPoint::new(ts.as_secs()?, value?)))
            .collect();
        ChainTimeSeries::new(chain, points)
    }
}

/// Unix timestamp that may be encoded as a number or a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Timestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Timestamp {
    pub fn as_secs(&self) -> Option<i64> {
        match self {
            Timestamp::Int(v) => Some(*v),
            Timestamp::Float(v) if v.is_finite() => Some(*v as i64),
            Timestamp::Float(_) => None,
            Timestamp::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// `GET {config_url}`
#[derive(Debug, Deserialize)]
pub(crate) struct ChainConfigResponse {
    #[serde(default, rename = "chainCoingeckoIds")]
    pub chain_coingecko_ids: HashMap<String, ChainConfigEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChainConfigEntry {
    #[serde(rename = "geckoId")]
    pub gecko_id: Option<String>,
    pub symbol: Option<String>,
}

impl ChainConfigResponse {
    pub fn into_metadata(self) -> BTreeMap<String, ChainMetadata> {
        self.chain_coingecko_ids
            .into_iter()
            .map(|(chain, entry)| {
                (
                    chain,
                    ChainMetadata {
                        gecko_id: entry.gecko_id,
                        symbol: entry.symbol,
                    },
                )
            })
            .collect()
    }
}

/// One id of `GET {coingecko_url}/simple/price`
#[derive(Debug, Deserialize)]
pub(crate) struct SimplePrice {
    pub usd_market_cap: Option<f64>,
}

pub(crate) fn market_caps_from(prices: HashMap<String, SimplePrice>) -> BTreeMap<String, f64> {
    prices
        .into_iter()
        .filter_map(|(id, price)| price.usd_market_cap.map(|mcap| (id, mcap)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_accepts_string_and_numeric_timestamps() {
        let json = r#"{"tvl": [["1600000000", 10.5], [1600086400, 11.0], ["bad", 1.0], [1600172800, null]]}"#;
        let resp: ChainChartResponse = serde_json::from_str(json).unwrap();
        let series = resp.into_series("Ethereum");

        assert_eq!(series.chain, "Ethereum");
        assert_eq!(
            series.points,
            vec![TvlPoint::new(1_600_000_000, 10.5), TvlPoint::new(1_600_086_400, 11.0)]
        );
    }

    #[test]
    fn test_protocols_drop_null_tvls() {
        let json = r#"{
            "chains": ["Ethereum", "BSC"],
            "protocols": [
                {"name": "Aave", "chains": ["Ethereum"], "chainTvls": {"Ethereum": 5.0, "Ethereum-borrowed": null}},
                {"name": "Pancake", "chains": ["BSC"]}
            ]
        }"#;
        let resp: ProtocolsResponse = serde_json::from_str(json).unwrap();
        let snapshot = ProtocolsSnapshot::from(resp);

        assert_eq!(snapshot.chains, vec!["Ethereum", "BSC"]);
        assert_eq!(snapshot.protocols.len(), 2);
        assert_eq!(snapshot.protocols[0].chain_tvls.len(), 1);
        assert!(snapshot.protocols[1].chain_tvls.is_empty());
    }

    #[test]
    fn test_chain_config_keeps_symbol_without_gecko_id() {
        let json = r#"{"chainCoingeckoIds": {
            "Ethereum": {"geckoId": "ethereum", "symbol": "ETH"},
            "Sora": {"symbol": "XOR"}
        }}"#;
        let resp: ChainConfigResponse = serde_json::from_str(json).unwrap();
        let meta = resp.into_metadata();

        assert_eq!(meta.len(), 2);
        assert_eq!(meta["Ethereum"].gecko_id.as_deref(), Some("ethereum"));
        assert_eq!(meta["Ethereum"].symbol.as_deref(), Some("ETH"));
        assert_eq!(meta["Sora"].gecko_id, None);
        assert_eq!(meta["Sora"].symbol.as_deref(), Some("XOR"));
    }

    #[test]
    fn test_market_caps_skip_missing() {
        let json = r#"{"ethereum": {"usd": 1.0, "usd_market_cap": 300.0}, "dead": {"usd": 0.1}}"#;
        let prices: HashMap<String, SimplePrice> = serde_json::from_str(json).unwrap();
        let caps = market_caps_from(prices);

        assert_eq!(caps.len(), 1);
        assert_eq!(caps["ethereum"], 300.0);
    }
}
