//! Display formatting for chart labels, tooltips and exports

use chrono::{DateTime, Utc};

/// `0.1234` -> `"12.34%"` with `decimals` fraction digits
pub fn to_percent(ratio: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, ratio * 100.0)
}

/// Share of `value` in `total` as a percentage string, `"0.00%"` when the
/// total is not positive
pub fn percent_of(value: f64, total: f64) -> String {
    let ratio = if total > 0.0 { value / total } else { 0.0 };
    to_percent(ratio, 2)
}

/// Compact USD amount: `$1.23b`, `$45.60m`, `$7.89k`, `$12.00`
pub fn format_usd(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1e12 {
        format!("{}${:.2}t", sign, abs / 1e12)
    } else if abs >= 1e9 {
        format!("{}${:.2}b", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}${:.2}m", sign, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}${:.2}k", sign, abs / 1e3)
    } else {
        format!("{}${:.2}", sign, abs)
    }
}

/// Signed percent change, `"+1.25%"`, or `"-"` when unavailable
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) => format!("{:+.2}%", c),
        None => "-".to_string(),
    }
}

fn utc(timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
}

/// Axis tick label: `"Jan 21"`
pub fn nice_monthly_date(timestamp: i64) -> String {
    utc(timestamp)
        .map(|dt| dt.format("%b %y").to_string())
        .unwrap_or_default()
}

/// Tooltip label: `"January 05, 2021"`
pub fn nice_date_year(timestamp: i64) -> String {
    utc(timestamp)
        .map(|dt| dt.format("%B %d, %Y").to_string())
        .unwrap_or_default()
}

/// Date column of the CSV export: `"05/01/2021"`
pub fn csv_date(timestamp: i64) -> String {
    utc(timestamp)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}
