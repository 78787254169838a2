//! Data types used by the aggregation and smoothing pipeline.

use serde::{Deserialize, Serialize};

/// Metric family, used to pick reduction methods and smoothing paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Continuous,
    Percentage,
    Binary,
    Categorical,
    Count,
}

/// How the points of one bucket are reduced to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    Average,
    Sum,
    /// Percentage of non-zero values in the bucket.
    Frequency,
    /// Most frequent exact value; ties go to the smallest value.
    Mode,
    /// Chronologically last point in the bucket.
    Latest,
}

/// Bucket coarseness, ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationLevel {
    Daily,
    Weekly,
    Monthly,
}

impl AggregationLevel {
    /// One step coarser; monthly stays monthly.
    pub fn escalated(self) -> Self {
        match self {
            AggregationLevel::Daily => AggregationLevel::Weekly,
            AggregationLevel::Weekly | AggregationLevel::Monthly => AggregationLevel::Monthly,
        }
    }
}

/// Settings for a single run of the period aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregationConfig {
    pub max_data_points: usize,
    pub method: AggregationMethod,
    /// Hint for renderers to keep zero-valued buckets visible. The aggregator
    /// itself never synthesizes missing days.
    pub preserve_zeros: bool,
}

/// How much reduction a call to the aggregator performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregatedDataInfo {
    pub original_count: usize,
    pub aggregated_count: usize,
    pub aggregation_level: AggregationLevel,
    pub method: AggregationMethod,
}

impl AggregatedDataInfo {
    /// Info for a run that received no points.
    pub fn empty(method: AggregationMethod) -> Self {
        Self {
            original_count: 0,
            aggregated_count: 0,
            aggregation_level: AggregationLevel::Daily,
            method,
        }
    }

    pub fn was_aggregated(&self) -> bool {
        self.aggregated_count < self.original_count
    }

    /// Percentage of points removed. Returns 0.0 for empty input.
    pub fn reduction_percentage(&self) -> f64 {
        if self.original_count == 0 {
            return 0.0;
        }
        let removed = self.original_count.saturating_sub(self.aggregated_count);
        removed as f64 / self.original_count as f64 * 100.0
    }
}

/// Pre-smoothing decimation applied before local regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    None,
    Uniform,
    TimeBasedGrid,
}

/// Smoother settings for one `(period, count)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessingConfig {
    pub should_process: bool,
    pub target_data_points: usize,
    /// Fraction of the sequence length used as the regression window, in (0, 1].
    pub loess_bandwidth: f64,
    pub sampling_strategy: SamplingStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(original: usize, aggregated: usize) -> AggregatedDataInfo {
        AggregatedDataInfo {
            original_count: original,
            aggregated_count: aggregated,
            aggregation_level: AggregationLevel::Weekly,
            method: AggregationMethod::Average,
        }
    }

    #[test]
    fn test_reduction_percentage() {
        assert_eq!(info(100, 25).reduction_percentage(), 75.0);
        assert_eq!(info(10, 10).reduction_percentage(), 0.0);
    }

    #[test]
    fn test_reduction_percentage_with_zero_original() {
        assert_eq!(info(0, 0).reduction_percentage(), 0.0);
        assert!(!info(0, 0).was_aggregated());
    }

    #[test]
    fn test_was_aggregated() {
        assert!(info(100, 25).was_aggregated());
        assert!(!info(25, 25).was_aggregated());
    }

    #[test]
    fn test_level_escalation_saturates() {
        assert_eq!(AggregationLevel::Daily.escalated(), AggregationLevel::Weekly);
        assert_eq!(AggregationLevel::Weekly.escalated(), AggregationLevel::Monthly);
        assert_eq!(AggregationLevel::Monthly.escalated(), AggregationLevel::Monthly);
        assert!(AggregationLevel::Daily < AggregationLevel::Monthly);
    }
}
