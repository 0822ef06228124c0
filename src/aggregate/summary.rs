//! Chain Summary Builder
//!
//! Joins each chain's own series with protocol counts, the extra-TVL
//! breakdown and market-cap metadata into one [`ChainSummary`] per chain.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use super::change::change_since;
use super::types::{ChainMetadata, ChainSummary, ChainTimeSeries, ProtocolListing};

/// Symbol used when a chain has no known native token
pub const UNKNOWN_SYMBOL: &str = "-";

/// Extra-TVL categories that can be folded into a chain's TVL
pub const EXTRA_TVL_CATEGORIES: [&str; 5] = ["staking", "pool2", "borrowed", "offers", "treasury"];

/// Builds per-chain summaries from series and metadata
pub struct ChainSummaryBuilder<'a> {
    protocol_counts: BTreeMap<String, u32>,
    extra_tvl: BTreeMap<String, BTreeMap<String, f64>>,
    metadata: &'a BTreeMap<String, ChainMetadata>,
    market_caps: &'a BTreeMap<String, f64>,
}

impl<'a> ChainSummaryBuilder<'a> {
    /// Prepare a builder.
    ///
    /// `metadata` maps chain name to its market-cap id, `market_caps` maps
    /// that id to a USD market cap.
    pub fn new(
        protocols: &[ProtocolListing],
        metadata: &'a BTreeMap<String, ChainMetadata>,
        market_caps: &'a BTreeMap<String, f64>,
    ) -> Self {
        Self {
            protocol_counts: protocol_counts(protocols),
            extra_tvl: extra_tvl_by_chain(protocols),
            metadata,
            market_caps,
        }
    }

    /// Summary for a single chain
    pub fn summarize(&self, series: &ChainTimeSeries) -> ChainSummary {
        let name = series.chain.as_str();
        let tvl = match series.latest() {
            Some(tvl) => tvl,
            None => {
                tracing::warn!(chain = %name, "Chain has no TVL history");
                0.0
            }
        };

        let meta = self.metadata.get(name);
        let mcap = meta
            .and_then(|m| m.gecko_id.as_ref())
            .and_then(|id| self.market_caps.get(id))
            .copied()
            .filter(|mcap| *mcap != 0.0);

        ChainSummary {
            name: name.to_string(),
            symbol: meta
                .and_then(|m| m.symbol.clone())
                .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
            tvl,
            mcap,
            mcaptvl: mcap_ratio(mcap, tvl),
            protocols: self.protocol_counts.get(name).copied().unwrap_or(0),
            extra_tvl: self.extra_tvl.get(name).cloned().unwrap_or_default(),
            change_1d: series.latest().and_then(|cur| change_since(series.value_days_ago(1), cur)),
            change_7d: series.latest().and_then(|cur| change_since(series.value_days_ago(7), cur)),
        }
    }

    /// Summaries for every chain, sorted by TVL descending
    pub fn build(&self, series: &[ChainTimeSeries]) -> Vec<ChainSummary> {
        let mut summaries: Vec<ChainSummary> = series.iter().map(|s| self.summarize(s)).collect();
        sort_by_tvl(&mut summaries);
        summaries
    }
}

/// Number of protocols listing each chain
pub fn protocol_counts(protocols: &[ProtocolListing]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for protocol in protocols {
        for chain in &protocol.chains {
            *counts.entry(chain.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Sum of `"<chain>-<category>"` TVL entries per chain and category
pub fn extra_tvl_by_chain(protocols: &[ProtocolListing]) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut extra: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for protocol in protocols {
        for (key, value) in &protocol.chain_tvls {
            let Some((chain, category)) = split_extra_key(key) else {
                continue;
            };
            *extra
                .entry(chain.to_string())
                .or_default()
                .entry(category.to_string())
                .or_insert(0.0) += value;
        }
    }
    extra
}

/// Split `"Ethereum-staking"` into `("Ethereum", "staking")`.
///
/// Only the first two dash-separated segments are used.
fn split_extra_key(key: &str) -> Option<(&str, &str)> {
    let mut parts = key.split('-');
    let chain = parts.next()?;
    let category = parts.next()?;
    Some((chain, category))
}

fn mcap_ratio(mcap: Option<f64>, tvl: f64) -> Option<f64> {
    match mcap {
        Some(mcap) if tvl > 0.0 => Some(mcap / tvl),
        _ => None,
    }
}

fn sort_by_tvl(summaries: &mut [ChainSummary]) {
    summaries.sort_by(|a, b| match b.tvl.total_cmp(&a.tvl) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
}

/// Extra-TVL categories to fold into each chain's headline TVL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraTvlToggles {
    enabled: BTreeSet<String>,
}

impl ExtraTvlToggles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable a category (case-insensitive)
    pub fn enable(mut self, category: &str) -> Self {
        self.enabled.insert(category.to_lowercase());
        self
    }

    pub fn set(&mut self, category: &str, enabled: bool) {
        let key = category.to_lowercase();
        if enabled {
            self.enabled.insert(key);
        } else {
            self.enabled.remove(&key);
        }
    }

    pub fn is_enabled(&self, category: &str) -> bool {
        self.enabled.contains(&category.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Parse a comma-separated list such as `"staking,pool2"`
    pub fn parse_list(list: &str) -> Self {
        list_items(list).fold(Self::new(), |toggles, category| toggles.enable(category))
    }

    /// Like [`parse_list`](Self::parse_list), but fails on the first
    /// category outside [`EXTRA_TVL_CATEGORIES`]
    pub fn try_parse_list(list: &str) -> Result<Self, String> {
        let mut toggles = Self::new();
        for category in list_items(list) {
            if !EXTRA_TVL_CATEGORIES.iter().any(|c| c.eq_ignore_ascii_case(category)) {
                return Err(format!(
                    "Unknown extra TVL category: {} (known: {})",
                    category,
                    EXTRA_TVL_CATEGORIES.join(", ")
                ));
            }
            toggles.set(category, true);
        }
        Ok(toggles)
    }
}

fn list_items(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Add enabled extra-TVL categories to each chain's TVL and re-sort.
///
/// `mcaptvl` is recomputed against the adjusted TVL; the 1d/7d changes
/// keep describing the base series.
pub fn apply_extra_tvl(summaries: &[ChainSummary], toggles: &ExtraTvlToggles) -> Vec<ChainSummary> {
    let mut adjusted: Vec<ChainSummary> = summaries.to_vec();
    if toggles.is_empty() {
        return adjusted;
    }

    for summary in &mut adjusted {
        let extra: f64 = summary
            .extra_tvl
            .iter()
            .filter(|(category, _)| toggles.is_enabled(category))
            .map(|(_, value)| value)
            .sum();
        summary.tvl += extra;
        summary.mcaptvl = mcap_ratio(summary.mcap, summary.tvl);
    }

    sort_by_tvl(&mut adjusted);
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(name: &str, chains: &[&str], tvls: &[(&str, f64)]) -> ProtocolListing {
        ProtocolListing {
            name: name.to_string(),
            chains: chains.iter().map(|c| c.to_string()).collect(),
            chain_tvls: tvls.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn metadata() -> BTreeMap<String, ChainMetadata> {
        let mut meta = BTreeMap::new();
        meta.insert(
            "Ethereum".to_string(),
            ChainMetadata {
                gecko_id: Some("ethereum".to_string()),
                symbol: Some("ETH".to_string()),
            },
        );
        meta.insert(
            "BSC".to_string(),
            ChainMetadata {
                gecko_id: Some("binancecoin".to_string()),
                symbol: Some("BNB".to_string()),
            },
        );
        meta.insert(
            "Sora".to_string(),
            ChainMetadata {
                gecko_id: None,
                symbol: Some("XOR".to_string()),
            },
        );
        meta
    }

    fn market_caps() -> BTreeMap<String, f64> {
        let mut caps = BTreeMap::new();
        caps.insert("ethereum".to_string(), 400.0);
        caps
    }

    #[test]
    fn test_one_day_change_without_week_history() {
        let protocols = Vec::new();
        let meta = metadata();
        let caps = market_caps();
        let builder = ChainSummaryBuilder::new(&protocols, &meta, &caps);

        let series = ChainTimeSeries::from_pairs("Ethereum", &[(1, 80.0), (2, 100.0)]);
        let summary = builder.summarize(&series);

        assert_eq!(summary.tvl, 100.0);
        assert_eq!(summary.change_1d, Some(25.0));
        assert_eq!(summary.change_7d, None);
        assert_eq!(summary.mcap, Some(400.0));
        assert_eq!(summary.mcaptvl, Some(4.0));
        assert_eq!(summary.symbol, "ETH");
    }

    #[test]
    fn test_seven_day_change() {
        let protocols = Vec::new();
        let meta = metadata();
        let caps = market_caps();
        let builder = ChainSummaryBuilder::new(&protocols, &meta, &caps);

        let pairs: Vec<(i64, f64)> = (0..8).map(|i| (i, if i == 0 { 50.0 } else { 100.0 })).collect();
        let summary = builder.summarize(&ChainTimeSeries::from_pairs("Ethereum", &pairs));

        assert_eq!(summary.change_7d, Some(100.0));
        assert_eq!(summary.change_1d, Some(0.0));
    }

    #[test]
    fn test_unknown_chain_gets_placeholders() {
        let protocols = Vec::new();
        let meta = metadata();
        let caps = market_caps();
        let builder = ChainSummaryBuilder::new(&protocols, &meta, &caps);

        let summary = builder.summarize(&ChainTimeSeries::from_pairs("Fantom", &[(1, 10.0)]));
        assert_eq!(summary.symbol, UNKNOWN_SYMBOL);
        assert_eq!(summary.mcap, None);
        assert_eq!(summary.mcaptvl, None);
        assert_eq!(summary.protocols, 0);
        assert!(summary.extra_tvl.is_empty());
    }

    #[test]
    fn test_known_chain_without_market_cap() {
        let protocols = Vec::new();
        let meta = metadata();
        let caps = market_caps();
        let builder = ChainSummaryBuilder::new(&protocols, &meta, &caps);

        let summary = builder.summarize(&ChainTimeSeries::from_pairs("BSC", &[(1, 10.0)]));
        assert_eq!(summary.symbol, "BNB");
        assert_eq!(summary.mcaptvl, None);
    }

    #[test]
    fn test_chain_without_gecko_id_keeps_symbol() {
        let protocols = Vec::new();
        let meta = metadata();
        let caps = market_caps();
        let builder = ChainSummaryBuilder::new(&protocols, &meta, &caps);

        let summary = builder.summarize(&ChainTimeSeries::from_pairs("Sora", &[(1, 10.0)]));
        assert_eq!(summary.symbol, "XOR");
        assert_eq!(summary.mcap, None);
        assert_eq!(summary.mcaptvl, None);
    }

    #[test]
    fn test_empty_series_and_zero_previous() {
        let protocols = Vec::new();
        let meta = metadata();
        let caps = market_caps();
        let builder = ChainSummaryBuilder::new(&protocols, &meta, &caps);

        let empty = builder.summarize(&ChainTimeSeries::new("Ethereum", Vec::new()));
        assert_eq!(empty.tvl, 0.0);
        assert_eq!(empty.mcaptvl, None);
        assert_eq!(empty.change_1d, None);

        let zero_prev = builder.summarize(&ChainTimeSeries::from_pairs("BSC", &[(1, 0.0), (2, 5.0)]));
        assert_eq!(zero_prev.change_1d, None);
    }

    #[test]
    fn test_protocol_counts_and_extra_tvl() {
        let protocols = vec![
            protocol(
                "Aave",
                &["Ethereum", "Polygon"],
                &[("Ethereum", 10.0), ("Ethereum-borrowed", 4.0), ("Polygon", 1.0)],
            ),
            protocol(
                "Curve",
                &["Ethereum"],
                &[("Ethereum", 8.0), ("Ethereum-staking", 2.0), ("Ethereum-borrowed", 1.5)],
            ),
        ];

        let counts = protocol_counts(&protocols);
        assert_eq!(counts["Ethereum"], 2);
        assert_eq!(counts["Polygon"], 1);

        let extra = extra_tvl_by_chain(&protocols);
        assert_eq!(extra["Ethereum"]["borrowed"], 5.5);
        assert_eq!(extra["Ethereum"]["staking"], 2.0);
        assert!(!extra.contains_key("Polygon"));
    }

    #[test]
    fn test_extra_tvl_key_uses_first_two_segments() {
        let protocols = vec![protocol(
            "Lido",
            &["Ethereum"],
            &[("Ethereum-staking-x", 3.0), ("Ethereum-staking", 1.0), ("Ethereum", 9.0)],
        )];

        let extra = extra_tvl_by_chain(&protocols);
        assert_eq!(extra["Ethereum"].len(), 1);
        assert_eq!(extra["Ethereum"]["staking"], 4.0);
    }

    #[test]
    fn test_build_sorts_by_tvl_desc() {
        let protocols = vec![protocol("P", &["BSC", "Ethereum"], &[])];
        let meta = metadata();
        let caps = market_caps();
        let builder = ChainSummaryBuilder::new(&protocols, &meta, &caps);

        let summaries = builder.build(&[
            ChainTimeSeries::from_pairs("BSC", &[(1, 5.0)]),
            ChainTimeSeries::from_pairs("Ethereum", &[(1, 50.0)]),
            ChainTimeSeries::from_pairs("Fantom", &[(1, 20.0)]),
        ]);

        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ethereum", "Fantom", "BSC"]);
        assert_eq!(summaries[0].protocols, 1);
    }

    #[test]
    fn test_apply_extra_tvl_adds_enabled_categories_and_resorts() {
        let mut a_extra = BTreeMap::new();
        a_extra.insert("staking".to_string(), 100.0);
        a_extra.insert("pool2".to_string(), 7.0);

        let summaries = vec![
            ChainSummary {
                name: "B".to_string(),
                symbol: "-".to_string(),
                tvl: 50.0,
                mcap: Some(100.0),
                mcaptvl: Some(2.0),
                protocols: 1,
                extra_tvl: BTreeMap::new(),
                change_1d: None,
                change_7d: None,
            },
            ChainSummary {
                name: "A".to_string(),
                symbol: "-".to_string(),
                tvl: 10.0,
                mcap: Some(220.0),
                mcaptvl: Some(22.0),
                protocols: 1,
                extra_tvl: a_extra,
                change_1d: None,
                change_7d: None,
            },
        ];

        let unchanged = apply_extra_tvl(&summaries, &ExtraTvlToggles::new());
        assert_eq!(unchanged, summaries);

        let adjusted = apply_extra_tvl(&summaries, &ExtraTvlToggles::new().enable("Staking"));
        assert_eq!(adjusted[0].name, "A");
        assert_eq!(adjusted[0].tvl, 110.0);
        assert_eq!(adjusted[0].mcaptvl, Some(2.0));
        assert_eq!(adjusted[1].tvl, 50.0);
    }

    #[test]
    fn test_toggles_parse_list() {
        let toggles = ExtraTvlToggles::parse_list("staking, POOL2,,");
        assert!(toggles.is_enabled("staking"));
        assert!(toggles.is_enabled("pool2"));
        assert!(!toggles.is_enabled("borrowed"));
    }

    #[test]
    fn test_toggles_try_parse_list_rejects_unknown() {
        let toggles = ExtraTvlToggles::try_parse_list(" Staking,pool2 ,").unwrap();
        assert!(toggles.is_enabled("staking"));
        assert!(toggles.is_enabled("pool2"));

        let err = ExtraTvlToggles::try_parse_list("staking,bogus").unwrap_err();
        assert!(err.contains("bogus"));

        assert!(ExtraTvlToggles::try_parse_list("").unwrap().is_empty());
    }
}
