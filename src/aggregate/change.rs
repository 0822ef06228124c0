//! Percent change between two TVL readings

/// Relative change from `previous` to `current`, in percent.
///
/// Undefined for `previous == 0`; use [`change_since`] when the previous
/// reading may be missing or zero.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    (current / previous) * 100.0 - 100.0
}

/// Guarded percent change.
///
/// Returns `None` when there is no previous reading, the previous reading
/// is zero, or the result is not finite.
pub fn change_since(previous: Option<f64>, current: f64) -> Option<f64> {
    let previous = previous?;
    if previous == 0.0 {
        return None;
    }
    let change = percent_change(previous, current);
    change.is_finite().then_some(change)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_values() {
        assert_eq!(percent_change(100.0, 150.0), 50.0);
        assert_eq!(percent_change(100.0, 50.0), -50.0);
        assert_eq!(percent_change(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_change_since_missing_previous() {
        assert_eq!(change_since(None, 100.0), None);
    }

    #[test]
    fn test_change_since_zero_previous() {
        assert_eq!(change_since(Some(0.0), 100.0), None);
    }

    #[test]
    fn test_change_since_non_finite() {
        assert_eq!(change_since(Some(100.0), f64::NAN), None);
    }

    #[test]
    fn test_change_since_present() {
        assert_eq!(change_since(Some(80.0), 100.0), Some(25.0));
    }
}
