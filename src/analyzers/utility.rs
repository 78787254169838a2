use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
///
/// Stays finite for finite inputs whose sum would overflow.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        sum / n
    } else {
        // Finite inputs near f64::MAX can overflow the plain sum.
        values.iter().map(|v| v / n).sum()
    }
}

/// Percentage (0–100) of values that are non-zero. Returns 0.0 for empty input.
pub fn non_zero_percent(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let hits = values.iter().filter(|v| **v != 0.0).count();
    hits as f64 / values.len() as f64 * 100.0
}

/// Most frequent exact value. Equally frequent values resolve to the smallest.
pub fn mode(values: &[f64]) -> Option<f64> {
    // Ordered keys iterate smallest first; -0.0 and 0.0 share a key.
    let mut counts: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(OrderedFloat(*v)).or_default() += 1;
    }

    let mut best: Option<(f64, usize)> = None;
    for (OrderedFloat(value), count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Tricube kernel `(1 - |u|^3)^3` for `|u| < 1`, else 0.
pub fn tricube(u: f64) -> f64 {
    let u = u.abs();
    if u >= 1.0 {
        return 0.0;
    }
    let t = 1.0 - u * u * u;
    t * t * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn test_non_zero_percent() {
        assert_eq!(non_zero_percent(&[1.0, 0.0, 1.0, 0.0]), 50.0);
        assert_eq!(non_zero_percent(&[]), 0.0);
    }

    #[test]
    fn test_mode_picks_most_frequent() {
        assert_eq!(mode(&[3.0, 1.0, 3.0, 2.0]), Some(3.0));
    }

    #[test]
    fn test_mode_tie_breaks_to_smallest() {
        assert_eq!(mode(&[5.0, 2.0, 5.0, 2.0, 9.0]), Some(2.0));
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn test_mode_counts_signed_zeros_together() {
        assert_eq!(mode(&[0.0, -0.0, 1.0, 1.0, 2.0]), Some(0.0));
        assert_eq!(mode(&[-0.0, 3.0, 0.0]), Some(0.0));
    }

    #[test]
    fn test_mean_of_huge_values_stays_finite() {
        assert_eq!(mean(&[1e308, 1e308]), 1e308);
        assert_eq!(mean(&[f64::MAX, f64::MAX]), f64::MAX);
    }

    #[test]
    fn test_tricube_shape() {
        assert_eq!(tricube(0.0), 1.0);
        assert_eq!(tricube(1.0), 0.0);
        assert_eq!(tricube(-1.5), 0.0);
        assert!((tricube(0.5) - 0.669921875).abs() < 1e-12);
    }
}
