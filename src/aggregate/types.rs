//! Core data types for the chain TVL aggregation pipeline
//!
//! - `ChainTimeSeries`: one chain's daily TVL history
//! - `DailyAggregateRow`: sparse per-date row of chain values
//! - `StackedDataset`: ordered rows plus the per-date sum index
//! - `ChainSummary`: per-chain snapshot for the token list
//! - `BucketEntry`: one slice of the top-N breakdown

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Earliest timestamp (seconds) with trusted chain data.
pub const MIN_TRUSTED_TIMESTAMP: i64 = 1_596_248_105;

/// Number of chains shown individually in the pie breakdown.
pub const DEFAULT_TOP_N: usize = 10;

/// Name of the remainder bucket.
pub const OTHER_BUCKET: &str = "Other";

/// One daily observation of a chain's TVL
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TvlPoint {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    /// Total value locked in USD
    pub tvl: f64,
}

impl TvlPoint {
    pub fn new(timestamp: i64, tvl: f64) -> Self {
        Self { timestamp, tvl }
    }
}

/// Daily TVL history of a single chain, ascending by timestamp.
///
/// Series may have gaps and are not aligned across chains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainTimeSeries {
    pub chain: String,
    pub points: Vec<TvlPoint>,
}

impl ChainTimeSeries {
    pub fn new(chain: impl Into<String>, points: Vec<TvlPoint>) -> Self {
        Self {
            chain: chain.into(),
            points,
        }
    }

    /// Build from raw `(timestamp, tvl)` pairs
    pub fn from_pairs(chain: impl Into<String>, pairs: &[(i64, f64)]) -> Self {
        Self::new(
            chain,
            pairs.iter().map(|&(t, v)| TvlPoint::new(t, v)).collect(),
        )
    }

    /// TVL recorded `days_ago` entries before the latest one.
    ///
    /// Lookback counts entries, not calendar days, so a gap in the
    /// series shifts the comparison point.
    pub fn value_days_ago(&self, days_ago: usize) -> Option<f64> {
        let len = self.points.len();
        if days_ago >= len {
            return None;
        }
        Some(self.points[len - 1 - days_ago].tvl)
    }

    /// Latest recorded TVL
    pub fn latest(&self) -> Option<f64> {
        self.value_days_ago(0)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// All chain values recorded for one date.
///
/// Sparse: a chain without data on this date has no key. A missing key
/// means "no data", never zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyAggregateRow {
    /// Unix timestamp in seconds
    pub date: i64,
    /// Chain name -> TVL in USD
    pub values: BTreeMap<String, f64>,
}

impl DailyAggregateRow {
    pub fn new(date: i64) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    /// Value for a chain, `None` when the chain has no data on this date
    pub fn get(&self, chain: &str) -> Option<f64> {
        self.values.get(chain).copied()
    }

    /// Sum of all values present in the row
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }
}

/// Per-date sum of TVL across every chain present on that date.
pub type DaySumIndex = BTreeMap<i64, f64>;

/// Output of the series aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StackedDataset {
    /// Rows ordered by `date` ascending
    pub rows: Vec<DailyAggregateRow>,
    /// Sum of each row's values, keyed by date
    pub day_sum: DaySumIndex,
}

impl StackedDataset {
    /// Most recent row
    pub fn latest(&self) -> Option<&DailyAggregateRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total for a date, `None` when no chain had data that day
    pub fn total_for(&self, date: i64) -> Option<f64> {
        self.day_sum.get(&date).copied()
    }
}

/// Per-chain summary shown in the chains table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainSummary {
    pub name: String,
    /// Native token symbol, `"-"` when unknown
    pub symbol: String,
    /// Current TVL in USD
    pub tvl: f64,
    /// Market cap of the native token in USD
    pub mcap: Option<f64>,
    /// Market cap divided by TVL
    pub mcaptvl: Option<f64>,
    /// Number of protocols deployed on the chain
    pub protocols: u32,
    /// Extra TVL per category (staking, pool2, borrowed, ...)
    #[serde(rename = "extraTvl")]
    pub extra_tvl: BTreeMap<String, f64>,
    /// Percent change versus one day ago
    pub change_1d: Option<f64>,
    /// Percent change versus seven days ago
    pub change_7d: Option<f64>,
}

/// One named value in the top-N breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketEntry {
    pub name: String,
    pub value: f64,
}

impl BucketEntry {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A protocol's chain membership and per-chain TVL breakdown
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProtocolListing {
    pub name: String,
    /// Chains the protocol is deployed on
    pub chains: Vec<String>,
    /// TVL keyed by chain, or by `"<chain>-<category>"` for extra TVL
    pub chain_tvls: BTreeMap<String, f64>,
}

/// External identity of a chain's native token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainMetadata {
    /// Market-cap provider id (CoinGecko id); chains without one get no mcap/TVL ratio
    pub gecko_id: Option<String>,
    pub symbol: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_days_ago() {
        let series = ChainTimeSeries::from_pairs("Ethereum", &[(1, 10.0), (2, 20.0), (3, 30.0)]);

        assert_eq!(series.latest(), Some(30.0));
        assert_eq!(series.value_days_ago(1), Some(20.0));
        assert_eq!(series.value_days_ago(2), Some(10.0));
        assert_eq!(series.value_days_ago(3), None);
    }

    #[test]
    fn test_empty_series_has_no_latest() {
        let series = ChainTimeSeries::new("Empty", Vec::new());
        assert!(series.is_empty());
        assert_eq!(series.latest(), None);
    }

    #[test]
    fn test_row_sparse_lookup() {
        let mut row = DailyAggregateRow::new(100);
        row.values.insert("BSC".to_string(), 5.0);

        assert_eq!(row.get("BSC"), Some(5.0));
        assert_eq!(row.get("Ethereum"), None);
        assert_eq!(row.total(), 5.0);
    }

    #[test]
    fn test_summary_serializes_extra_tvl_camel_case() {
        let summary = ChainSummary {
            name: "Ethereum".to_string(),
            symbol: "ETH".to_string(),
            tvl: 1.0,
            mcap: None,
            mcaptvl: None,
            protocols: 3,
            extra_tvl: BTreeMap::new(),
            change_1d: None,
            change_7d: Some(2.0),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("extraTvl").is_some());
        assert!(json["change_1d"].is_null());
        assert_eq!(json["change_7d"], 2.0);
    }
}
