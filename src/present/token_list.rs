//! Chains table rows (name, protocols, TVL, 1d/7d change, mcap/TVL)

use serde::Serialize;

use super::format::{format_change, format_usd};
use crate::aggregate::ChainSummary;

/// A chain summary formatted for display
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TokenListRow {
    pub rank: usize,
    pub name: String,
    pub symbol: String,
    pub protocols: String,
    pub change_1d: String,
    pub change_7d: String,
    pub tvl: String,
    pub mcaptvl: String,
    /// Path of the chain's detail page
    pub link: String,
}

pub const TOKEN_LIST_HEADERS: [&str; 8] =
    ["#", "Name", "Symbol", "Protocols", "1d Change", "7d Change", "TVL", "Mcap/TVL"];

pub fn token_list(summaries: &[ChainSummary]) -> Vec<TokenListRow> {
    summaries
        .iter()
        .enumerate()
        .map(|(idx, s)| TokenListRow {
            rank: idx + 1,
            name: s.name.clone(),
            symbol: s.symbol.clone(),
            protocols: s.protocols.to_string(),
            change_1d: format_change(s.change_1d),
            change_7d: format_change(s.change_7d),
            tvl: format_usd(s.tvl),
            mcaptvl: s
                .mcaptvl
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "-".to_string()),
            link: format!("/chain/{}", s.name),
        })
        .collect()
}

impl TokenListRow {
    /// Cells in [`TOKEN_LIST_HEADERS`] order
    pub fn cells(&self) -> [String; 8] {
        [
            self.rank.to_string(),
            self.name.clone(),
            self.symbol.clone(),
            self.protocols.clone(),
            self.change_1d.clone(),
            self.change_7d.clone(),
            self.tvl.clone(),
            self.mcaptvl.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_rows_are_ranked_and_formatted() {
        let summaries = vec![ChainSummary {
            name: "Ethereum".to_string(),
            symbol: "ETH".to_string(),
            tvl: 2_500_000_000.0,
            mcap: Some(5_000_000_000.0),
            mcaptvl: Some(2.0),
            protocols: 42,
            extra_tvl: BTreeMap::new(),
            change_1d: Some(1.5),
            change_7d: None,
        }];

        let rows = token_list(&summaries);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].tvl, "$2.50b");
        assert_eq!(rows[0].change_1d, "+1.50%");
        assert_eq!(rows[0].change_7d, "-");
        assert_eq!(rows[0].mcaptvl, "2.00");
        assert_eq!(rows[0].link, "/chain/Ethereum");
        assert_eq!(rows[0].cells()[3], "42");
    }
}
