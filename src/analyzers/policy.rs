use crate::analyzers::types::{AggregationConfig, AggregationMethod, DataType};

/// `(upper bound on point count, cap)` tiers, checked in order.
static CAP_TIERS: &[(usize, usize)] = &[(31, 31), (90, 45), (180, 30), (365, 26)];

/// Cap used past the last tier. Higher than the tier before it, since very long
/// series of categorical data are usually sparse already.
const LONG_RANGE_CAP: usize = 52;

/// Default reduction method for a metric family.
pub fn default_method(data_type: DataType) -> AggregationMethod {
    match data_type {
        DataType::Continuous | DataType::Percentage => AggregationMethod::Average,
        DataType::Binary => AggregationMethod::Frequency,
        DataType::Categorical => AggregationMethod::Mode,
        DataType::Count => AggregationMethod::Sum,
    }
}

/// Picks the aggregation config for `data_count` points of `data_type`.
pub fn get_optimal_config(data_type: DataType, data_count: usize) -> AggregationConfig {
    let max_data_points = CAP_TIERS
        .iter()
        .find(|(upper, _)| data_count <= *upper)
        .map(|(_, cap)| *cap)
        .unwrap_or(LONG_RANGE_CAP);

    AggregationConfig {
        max_data_points,
        method: default_method(data_type),
        preserve_zeros: matches!(data_type, DataType::Binary | DataType::Count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_per_type() {
        assert_eq!(default_method(DataType::Continuous), AggregationMethod::Average);
        assert_eq!(default_method(DataType::Percentage), AggregationMethod::Average);
        assert_eq!(default_method(DataType::Binary), AggregationMethod::Frequency);
        assert_eq!(default_method(DataType::Categorical), AggregationMethod::Mode);
        assert_eq!(default_method(DataType::Count), AggregationMethod::Sum);
    }

    #[test]
    fn test_cap_tiers() {
        let cap = |n| get_optimal_config(DataType::Continuous, n).max_data_points;
        assert_eq!(cap(0), 31);
        assert_eq!(cap(31), 31);
        assert_eq!(cap(32), 45);
        assert_eq!(cap(120), 30);
        assert_eq!(cap(365), 26);
        assert_eq!(cap(1000), 52);
    }

    #[test]
    fn test_preserve_zeros_for_binary_and_count() {
        assert!(get_optimal_config(DataType::Binary, 10).preserve_zeros);
        assert!(get_optimal_config(DataType::Count, 10).preserve_zeros);
        assert!(!get_optimal_config(DataType::Categorical, 10).preserve_zeros);
    }
}
