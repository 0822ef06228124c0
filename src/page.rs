//! Chains Page Build
//!
//! Fetches every input concurrently and runs the aggregation pipeline:
//!
//! 1. protocols + chain config (in parallel)
//! 2. every chain's series + market caps (in parallel)
//! 3. aggregate -> summaries, stacked dataset, top-N breakdown, colors
//!
//! All fetches must succeed; the first failure fails the whole build.

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::{
    apply_extra_tvl, latest_breakdown, BucketEntry, ChainSeriesAggregator, ChainSummary,
    ChainSummaryBuilder, ExtraTvlToggles, StackedDataset, DEFAULT_TOP_N, MIN_TRUSTED_TIMESTAMP,
};
use crate::export::{to_csv_string, ExportError};
use crate::present::{dominance_chart, pie_chart, ChainColors, DisplayMode, DominanceChart, PieChart};
use crate::sources::{DataSource, SourceError};

/// Tunables of a page build
#[derive(Debug, Clone, Copy)]
pub struct PageSettings {
    /// Chains shown individually in the pie chart
    pub top_n: usize,
    /// Points older than this are dropped from the stacked dataset
    pub min_timestamp: i64,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            min_timestamp: MIN_TRUSTED_TIMESTAMP,
        }
    }
}

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Failed to fetch page data: {0}")]
    Source(#[from] SourceError),

    /// A recent build failed and no page is cached
    #[error("Chains page unavailable, last build failed: {0}")]
    Unavailable(String),
}

/// Everything the chains page renders, computed once per build
#[derive(Debug, Clone, Serialize)]
pub struct ChainsPage {
    /// Chains in source order (CSV columns, stacking order)
    pub chains: Vec<String>,
    /// Per-chain summaries sorted by TVL, without extra TVL
    pub summaries: Vec<ChainSummary>,
    pub dataset: StackedDataset,
    /// Latest top-N breakdown with the `"Other"` bucket
    pub current: Vec<BucketEntry>,
    pub colors: ChainColors,
    pub built_at: DateTime<Utc>,
}

impl ChainsPage {
    /// Summaries with the enabled extra-TVL categories folded in
    pub fn summaries_with(&self, toggles: &ExtraTvlToggles) -> Vec<ChainSummary> {
        apply_extra_tvl(&self.summaries, toggles)
    }

    pub fn dominance(&self, mode: DisplayMode) -> DominanceChart {
        dominance_chart(&self.dataset, &self.chains, &self.colors, mode)
    }

    pub fn pie(&self) -> PieChart {
        pie_chart(&self.current, &self.colors)
    }

    pub fn to_csv(&self) -> Result<String, ExportError> {
        to_csv_string(&self.dataset, &self.chains)
    }

    /// Seconds since the page was built
    pub fn age_seconds(&self) -> i64 {
        (Utc::now() - self.built_at).num_seconds()
    }
}

/// Fetch and build the chains page
pub async fn build_chains_page(
    source: &dyn DataSource,
    settings: &PageSettings,
) -> Result<ChainsPage, PageError> {
    let started = std::time::Instant::now();
    tracing::info!(source = source.name(), "Building chains page");

    let (snapshot, metadata) = tokio::try_join!(source.protocols(), source.chain_metadata())?;

    let mut gecko_ids: Vec<String> = metadata.values().filter_map(|m| m.gecko_id.clone()).collect();
    gecko_ids.sort();
    gecko_ids.dedup();

    let series_calls = try_join_all(snapshot.chains.iter().map(|chain| source.chain_series(chain)));
    let (series, market_caps) = tokio::try_join!(series_calls, source.market_caps(&gecko_ids))?;

    let summaries = ChainSummaryBuilder::new(&snapshot.protocols, &metadata, &market_caps).build(&series);
    let dataset = ChainSeriesAggregator::new(settings.min_timestamp).aggregate(&series);
    let current = latest_breakdown(dataset.latest(), settings.top_n);
    let colors = ChainColors::assign(&snapshot.chains);

    tracing::info!(
        chains = snapshot.chains.len(),
        protocols = snapshot.protocols.len(),
        days = dataset.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Chains page built"
    );

    Ok(ChainsPage {
        chains: snapshot.chains,
        summaries,
        dataset,
        current,
        colors,
        built_at: Utc::now(),
    })
}
