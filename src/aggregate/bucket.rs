//! Top-N bucketing of the latest chain values

use std::cmp::Ordering;

use super::types::{BucketEntry, DailyAggregateRow, OTHER_BUCKET};

/// Keep the `n` largest chains of `row` and fold the rest into `"Other"`.
///
/// Sorted by value descending, ties broken by chain name ascending. The
/// `"Other"` entry is always appended, even when it is zero.
pub fn top_n_with_other(row: &DailyAggregateRow, n: usize) -> Vec<BucketEntry> {
    let mut entries: Vec<(&String, f64)> = row.values.iter().map(|(k, v)| (k, *v)).collect();
    entries.sort_by(|a, b| compare_desc(a.1, b.1).then_with(|| a.0.cmp(b.0)));

    let split = n.min(entries.len());
    let other: f64 = entries[split..].iter().map(|(_, v)| v).sum();

    entries[..split]
        .iter()
        .map(|(name, value)| BucketEntry::new(name.as_str(), *value))
        .chain(std::iter::once(BucketEntry::new(OTHER_BUCKET, other)))
        .collect()
}

/// Top-N breakdown of the most recent row, `[Other = 0]` when there is none
pub fn latest_breakdown(row: Option<&DailyAggregateRow>, n: usize) -> Vec<BucketEntry> {
    match row {
        Some(row) => top_n_with_other(row, n),
        None => vec![BucketEntry::new(OTHER_BUCKET, 0.0)],
    }
}

fn compare_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with(values: &[(&str, f64)]) -> DailyAggregateRow {
        let mut row = DailyAggregateRow::new(0);
        for (name, value) in values {
            row.values.insert(name.to_string(), *value);
        }
        row
    }

    #[test]
    fn test_fewer_entries_than_n() {
        let row = row_with(&[("A", 1.0), ("B", 3.0), ("C", 2.0)]);
        let result = top_n_with_other(&row, 10);

        assert_eq!(result.len(), 4);
        let names: Vec<&str> = result.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A", "Other"]);
        assert_eq!(result[3].value, 0.0);
    }

    #[test]
    fn test_remainder_summed_into_other() {
        let values: Vec<(String, f64)> = (0..15).map(|i| (format!("chain{:02}", i), i as f64)).collect();
        let refs: Vec<(&str, f64)> = values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        let row = row_with(&refs);

        let result = top_n_with_other(&row, 10);
        assert_eq!(result.len(), 11);
        assert_eq!(result[0].name, "chain14");
        assert_eq!(result[9].name, "chain05");

        let total = row.total();
        let top: f64 = result[..10].iter().map(|e| e.value).sum();
        assert_eq!(result[10].name, "Other");
        assert_eq!(result[10].value, total - top);
        assert_eq!(result[10].value, 0.0 + 1.0 + 2.0 + 3.0 + 4.0);
    }

    #[test]
    fn test_ties_break_by_name() {
        let row = row_with(&[("Zeta", 5.0), ("Alpha", 5.0), ("Mid", 5.0)]);
        let result = top_n_with_other(&row, 2);

        assert_eq!(result[0].name, "Alpha");
        assert_eq!(result[1].name, "Mid");
        assert_eq!(result[2].value, 5.0);
    }

    #[test]
    fn test_missing_row() {
        let result = latest_breakdown(None, 10);
        assert_eq!(result, vec![BucketEntry::new("Other", 0.0)]);
    }

    #[test]
    fn test_n_zero_puts_everything_in_other() {
        let row = row_with(&[("A", 1.0), ("B", 2.0)]);
        let result = top_n_with_other(&row, 0);
        assert_eq!(result, vec![BucketEntry::new("Other", 3.0)]);
    }
}
