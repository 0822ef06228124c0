//! # chaintvl
//!
//! Chain TVL dashboard pipeline: fetches protocol and per-chain TVL data,
//! aggregates it into chart-ready series and serves the result.
//!
//! ## Features
//!
//! - **Aggregation**: sparse outer join of per-chain series with day sums
//! - **Summaries**: 1d/7d change, protocol counts, market-cap ratios,
//!   opt-in extra TVL (staking, pool2, ...)
//! - **Charts**: dominance (stacked area) and top-N pie models with a
//!   shared color map
//! - **Export**: CSV of the stacked dataset
//! - **Serving**: REST API with a revalidating page cache
//!
//! ## Modules
//!
//! - [`aggregate`]: Pure aggregation pipeline
//! - [`sources`]: Upstream data sources
//! - [`page`]: Concurrent fetch + pipeline into a [`ChainsPage`]
//! - [`present`]: Chart and table models
//! - [`export`]: CSV export
//! - [`settings`]: Display preferences and the settings menu
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chaintvl::page::{build_chains_page, PageSettings};
//! use chaintvl::sources::{HttpDataSource, HttpSourceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpDataSource::new(HttpSourceConfig::default())?;
//!     let page = build_chains_page(&source, &PageSettings::default()).await?;
//!
//!     for chain in page.summaries.iter().take(5) {
//!         println!("{}: {:.0}", chain.name, chain.tvl);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod config;
pub mod export;
pub mod page;
pub mod present;
pub mod settings;
pub mod sources;

// Re-export top-level types for convenience
pub use aggregate::{
    BucketEntry, ChainSeriesAggregator, ChainSummary, ChainTimeSeries, DailyAggregateRow,
    ExtraTvlToggles, StackedDataset,
};

pub use page::{build_chains_page, ChainsPage, PageError, PageSettings};

pub use present::{ChainColors, DisplayMode, DominanceChart, PieChart, TokenListRow};

pub use export::ExportError;

pub use settings::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, SettingsError, SettingsMenu,
};

pub use sources::{DataSource, HttpDataSource, SourceError, StaticDataSource};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
