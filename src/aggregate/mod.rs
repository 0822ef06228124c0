//! Chain TVL aggregation pipeline
//!
//! Pure transformations from raw per-chain series into chart-ready data:
//!
//! 1. [`ChainSeriesAggregator`] outer-joins every chain on timestamp
//! 2. [`top_n_with_other`] reduces the latest row to a pie breakdown
//! 3. [`ChainSummaryBuilder`] produces the per-chain table rows
//! 4. [`apply_extra_tvl`] folds opt-in extra TVL categories into the table

mod bucket;
mod change;
mod series;
mod summary;
mod types;

pub use bucket::{latest_breakdown, top_n_with_other};
pub use change::{change_since, percent_change};
pub use series::{find_duplicate_timestamps, ChainSeriesAggregator};
pub use summary::{
    apply_extra_tvl, extra_tvl_by_chain, protocol_counts, ChainSummaryBuilder, ExtraTvlToggles,
    EXTRA_TVL_CATEGORIES, UNKNOWN_SYMBOL,
};
pub use types::{
    BucketEntry, ChainMetadata, ChainSummary, ChainTimeSeries, DailyAggregateRow, DaySumIndex,
    ProtocolListing, StackedDataset, TvlPoint, DEFAULT_TOP_N, MIN_TRUSTED_TIMESTAMP, OTHER_BUCKET,
};
