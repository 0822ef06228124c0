//! Dominance Chart
//!
//! Stacked-area model of the aggregated dataset. In percent mode each
//! day's values are normalized by that day's total, so the stack always
//! reaches 100%; in absolute mode values are plotted as USD.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::colors::ChainColors;
use super::format::{format_usd, nice_date_year, nice_monthly_date, percent_of};
use crate::aggregate::StackedDataset;

/// How values are stacked and reported
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Share of the day's total
    #[default]
    Percent,
    /// USD value
    Absolute,
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percent" | "pct" | "%" => Ok(DisplayMode::Percent),
            "absolute" | "abs" | "usd" => Ok(DisplayMode::Absolute),
            other => Err(format!("Unknown display mode: {}", other)),
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayMode::Percent => write!(f, "percent"),
            DisplayMode::Absolute => write!(f, "absolute"),
        }
    }
}

/// One stacked layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AreaSeries {
    pub chain: String,
    pub color: String,
}

/// One tooltip line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TooltipItem {
    pub chain: String,
    pub text: String,
}

/// One date on the x axis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DominancePoint {
    pub date: i64,
    /// Axis tick label
    pub tick: String,
    /// Tooltip header
    pub label: String,
    /// Plotted value per chain present on this date
    pub values: BTreeMap<String, f64>,
    /// Tooltip lines, largest first
    pub tooltip: Vec<TooltipItem>,
}

/// Complete stacked-area chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DominanceChart {
    pub mode: DisplayMode,
    pub series: Vec<AreaSeries>,
    pub points: Vec<DominancePoint>,
}

/// Build the dominance chart for `chains` (stacking order) over `dataset`
pub fn dominance_chart(
    dataset: &StackedDataset,
    chains: &[String],
    colors: &ChainColors,
    mode: DisplayMode,
) -> DominanceChart {
    let series = chains
        .iter()
        .map(|chain| AreaSeries {
            chain: chain.clone(),
            color: colors.get(chain).to_string(),
        })
        .collect();

    let points = dataset
        .rows
        .iter()
        .map(|row| {
            let total = dataset.total_for(row.date).unwrap_or(0.0);

            let values = row
                .values
                .iter()
                .map(|(chain, value)| {
                    let plotted = match mode {
                        DisplayMode::Percent if total > 0.0 => value / total * 100.0,
                        DisplayMode::Percent => 0.0,
                        DisplayMode::Absolute => *value,
                    };
                    (chain.clone(), plotted)
                })
                .collect();

            let mut ranked: Vec<(&String, f64)> = row.values.iter().map(|(k, v)| (k, *v)).collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

            let tooltip = ranked
                .into_iter()
                .map(|(chain, value)| TooltipItem {
                    chain: chain.clone(),
                    text: match mode {
                        DisplayMode::Percent => percent_of(value, total),
                        DisplayMode::Absolute => format_usd(value),
                    },
                })
                .collect();

            DominancePoint {
                date: row.date,
                tick: nice_monthly_date(row.date),
                label: nice_date_year(row.date),
                values,
                tooltip,
            }
        })
        .collect();

    DominanceChart {
        mode,
        series,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{ChainSeriesAggregator, ChainTimeSeries};

    const T0: i64 = 1_609_804_800;

    fn dataset() -> (StackedDataset, Vec<String>) {
        let series = vec![
            ChainTimeSeries::from_pairs("Ethereum", &[(T0, 75.0), (T0 + 86_400, 60.0)]),
            ChainTimeSeries::from_pairs("BSC", &[(T0, 25.0)]),
        ];
        let chains = vec!["Ethereum".to_string(), "BSC".to_string()];
        (ChainSeriesAggregator::default().aggregate(&series), chains)
    }

    #[test]
    fn test_percent_mode_normalizes_by_day_sum() {
        let (data, chains) = dataset();
        let colors = ChainColors::assign(&chains);
        let chart = dominance_chart(&data, &chains, &colors, DisplayMode::Percent);

        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].color, colors.get("Ethereum"));

        let first = &chart.points[0];
        assert_eq!(first.values["Ethereum"], 75.0);
        assert_eq!(first.values["BSC"], 25.0);
        assert_eq!(first.tooltip[0].chain, "Ethereum");
        assert_eq!(first.tooltip[0].text, "75.00%");
        assert_eq!(first.label, "January 05, 2021");
        assert_eq!(first.tick, "Jan 21");

        let second = &chart.points[1];
        assert_eq!(second.values["Ethereum"], 100.0);
        assert!(!second.values.contains_key("BSC"));
    }

    #[test]
    fn test_absolute_mode_reports_usd() {
        let (data, chains) = dataset();
        let colors = ChainColors::assign(&chains);
        let chart = dominance_chart(&data, &chains, &colors, DisplayMode::Absolute);

        let first = &chart.points[0];
        assert_eq!(first.values["Ethereum"], 75.0);
        assert_eq!(first.tooltip[1].text, "$25.00");
    }

    #[test]
    fn test_zero_total_day() {
        let series = vec![ChainTimeSeries::from_pairs("Dead", &[(T0, 0.0)])];
        let data = ChainSeriesAggregator::default().aggregate(&series);
        let chains = vec!["Dead".to_string()];
        let chart = dominance_chart(&data, &chains, &ChainColors::assign(&chains), DisplayMode::Percent);

        assert_eq!(chart.points[0].values["Dead"], 0.0);
        assert_eq!(chart.points[0].tooltip[0].text, "0.00%");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("percent".parse::<DisplayMode>().unwrap(), DisplayMode::Percent);
        assert_eq!("USD".parse::<DisplayMode>().unwrap(), DisplayMode::Absolute);
        assert!("pie".parse::<DisplayMode>().is_err());
        assert_eq!(DisplayMode::Absolute.to_string(), "absolute");
    }
}
