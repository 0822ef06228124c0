//! Chain Series Aggregator
//!
//! Outer-joins per-chain daily series on timestamp into one date-indexed
//! table plus a per-date sum.
//!
//! # Duplicate timestamps
//!
//! A chain that reports the same timestamp twice keeps only the last value
//! in the row, while the day sum receives both values. Totals downstream
//! depend on this, so it is kept as is and reported with a warning.

use std::collections::{BTreeMap, BTreeSet};

use super::types::{ChainTimeSeries, DailyAggregateRow, StackedDataset, MIN_TRUSTED_TIMESTAMP};

/// Merges per-chain series into a [`StackedDataset`]
#[derive(Debug, Clone, Copy)]
pub struct ChainSeriesAggregator {
    min_timestamp: i64,
}

impl Default for ChainSeriesAggregator {
    fn default() -> Self {
        Self::new(MIN_TRUSTED_TIMESTAMP)
    }
}

impl ChainSeriesAggregator {
    /// Create an aggregator that drops points older than `min_timestamp`
    pub fn new(min_timestamp: i64) -> Self {
        Self { min_timestamp }
    }

    pub fn min_timestamp(&self) -> i64 {
        self.min_timestamp
    }

    /// Aggregate all series.
    ///
    /// Chains are folded in name order so the floating-point sums do not
    /// depend on the order of `series`. Chain names are expected to be
    /// unique across `series`.
    pub fn aggregate(&self, series: &[ChainTimeSeries]) -> StackedDataset {
        let mut ordered: Vec<&ChainTimeSeries> = series.iter().collect();
        ordered.sort_by(|a, b| a.chain.cmp(&b.chain));

        let mut rows: BTreeMap<i64, DailyAggregateRow> = BTreeMap::new();
        let mut day_sum: BTreeMap<i64, f64> = BTreeMap::new();

        for chain in ordered {
            for point in &chain.points {
                if point.timestamp < self.min_timestamp {
                    continue;
                }

                let row = rows
                    .entry(point.timestamp)
                    .or_insert_with(|| DailyAggregateRow::new(point.timestamp));

                if row.values.insert(chain.chain.clone(), point.tvl).is_some() {
                    tracing::warn!(
                        chain = %chain.chain,
                        timestamp = point.timestamp,
                        "Duplicate timestamp in chain series, day sum counts it twice"
                    );
                }

                *day_sum.entry(point.timestamp).or_insert(0.0) += point.tvl;
            }
        }

        tracing::debug!(
            chains = series.len(),
            rows = rows.len(),
            "Aggregated chain series"
        );

        StackedDataset {
            rows: rows.into_values().collect(),
            day_sum,
        }
    }
}

/// Timestamps that occur more than once in a series
pub fn find_duplicate_timestamps(series: &ChainTimeSeries) -> Vec<i64> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();

    for point in &series.points {
        if !seen.insert(point.timestamp) {
            duplicates.insert(point.timestamp);
        }
    }

    duplicates.into_iter().collect()
}
