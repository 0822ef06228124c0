//! Pie chart of the latest top-N breakdown

use serde::{Deserialize, Serialize};

use super::colors::ChainColors;
use super::format::{format_usd, percent_of};
use crate::aggregate::BucketEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    /// Share of the total in percent, 0 when the total is not positive
    pub share: f64,
    pub color: String,
    /// Tooltip text, e.g. `"$1.20b (42.00%)"`
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieChart {
    pub total: f64,
    pub slices: Vec<PieSlice>,
}

pub fn pie_chart(entries: &[BucketEntry], colors: &ChainColors) -> PieChart {
    let total: f64 = entries.iter().map(|e| e.value).sum();

    let slices = entries
        .iter()
        .map(|entry| PieSlice {
            name: entry.name.clone(),
            value: entry.value,
            share: if total > 0.0 {
                entry.value / total * 100.0
            } else {
                0.0
            },
            color: colors.get(&entry.name).to_string(),
            label: format!("{} ({})", format_usd(entry.value), percent_of(entry.value, total)),
        })
        .collect();

    PieChart { total, slices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::present::colors::OTHER_COLOR;

    #[test]
    fn test_slices_share_and_colors() {
        let entries = vec![
            BucketEntry::new("Ethereum", 300.0),
            BucketEntry::new("BSC", 100.0),
            BucketEntry::new("Other", 0.0),
        ];
        let colors = ChainColors::assign(&["Ethereum".to_string(), "BSC".to_string()]);
        let chart = pie_chart(&entries, &colors);

        assert_eq!(chart.total, 400.0);
        assert_eq!(chart.slices[0].share, 75.0);
        assert_eq!(chart.slices[0].label, "$300.00 (75.00%)");
        assert_eq!(chart.slices[2].color, OTHER_COLOR);
    }

    #[test]
    fn test_empty_total() {
        let chart = pie_chart(&[BucketEntry::new("Other", 0.0)], &ChainColors::default());
        assert_eq!(chart.total, 0.0);
        assert_eq!(chart.slices[0].share, 0.0);
    }
}
