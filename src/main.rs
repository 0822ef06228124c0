//! Chain TVL one-shot build
//!
//! Fetches every source once, builds the chains page and logs a summary.

use chaintvl::config::Config;
use chaintvl::page::build_chains_page;
use chaintvl::present::format::{format_change, format_usd, to_percent};
use chaintvl::sources::HttpDataSource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "chaintvl=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Chain TVL v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_default();
    let source = HttpDataSource::new(config.sources.to_source_config())?;

    let page = build_chains_page(&source, &config.dashboard.page_settings()).await?;

    let total: f64 = page.summaries.iter().map(|s| s.tvl).sum();
    tracing::info!(
        "{} chains, {} days, total TVL {}",
        page.chains.len(),
        page.dataset.len(),
        format_usd(total)
    );

    for summary in page.summaries.iter().take(config.dashboard.top_n) {
        let share = if total > 0.0 { summary.tvl / total } else { 0.0 };
        tracing::info!(
            "{:<16} {:>10} {:>8} 1d {:>8} 7d {:>8}",
            summary.name,
            format_usd(summary.tvl),
            to_percent(share, 2),
            format_change(summary.change_1d),
            format_change(summary.change_7d),
        );
    }

    if let Some(other) = page.current.last() {
        tracing::info!("Other: {}", format_usd(other.value));
    }

    Ok(())
}
