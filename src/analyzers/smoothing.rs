//! Adaptive downsampling and tricube-weighted local regression for long ranges.
//!
//! Settings come from a fixed `(period, count)` table so the same request
//! always smooths the same way, whatever the data looks like.

use crate::analyzers::types::{DataType, ProcessingConfig, SamplingStrategy};
use crate::analyzers::utility::tricube;
use crate::model::{DataPoint, RawValue, TimePeriod, sort_by_date};
use chrono::TimeDelta;
use tracing::debug;

/// Smallest regression window, in points.
const MIN_WINDOW: usize = 3;
const IDLE_BANDWIDTH: f64 = 0.3;

/// Looks up the smoother settings for `count` points over `period`.
pub fn processing_config(period: TimePeriod, count: usize) -> ProcessingConfig {
    let process = |target_data_points, loess_bandwidth, sampling_strategy| ProcessingConfig {
        should_process: true,
        target_data_points,
        loess_bandwidth,
        sampling_strategy,
    };

    match period {
        TimePeriod::ThreeMonths if count > 60 => process(45, 0.15, SamplingStrategy::Uniform),
        TimePeriod::SixMonths if count > 80 => process(60, 0.12, SamplingStrategy::TimeBasedGrid),
        TimePeriod::Year if count > 100 => process(73, 0.10, SamplingStrategy::TimeBasedGrid),
        TimePeriod::AllTime if count > 1000 => process(100, 0.08, SamplingStrategy::Uniform),
        TimePeriod::AllTime if count > 120 => {
            process(100, 0.08, SamplingStrategy::TimeBasedGrid)
        }
        _ => ProcessingConfig {
            should_process: false,
            target_data_points: count,
            loess_bandwidth: IDLE_BANDWIDTH,
            sampling_strategy: SamplingStrategy::None,
        },
    }
}

/// Smooths and thins `points` for display over `period`.
///
/// Output is sorted by date. Short ranges come back sorted but otherwise
/// untouched. Binary metrics are bucketed and rounded instead of regressed.
pub fn process(points: &[DataPoint], period: TimePeriod, data_type: DataType) -> Vec<DataPoint> {
    let mut sorted = points.to_vec();
    sort_by_date(&mut sorted);

    let config = processing_config(period, sorted.len());
    if !config.should_process || sorted.len() < 2 {
        return sorted;
    }

    let original = sorted.len();
    let output = if data_type == DataType::Binary {
        binary_buckets(&sorted, config.target_data_points)
    } else {
        let sampled = match config.sampling_strategy {
            SamplingStrategy::None => sorted,
            SamplingStrategy::Uniform => sample_uniform(&sorted, config.target_data_points),
            SamplingStrategy::TimeBasedGrid => {
                sample_time_grid(&sorted, config.target_data_points)
            }
        };
        loess_smooth(&sampled, config.loess_bandwidth)
    };

    debug!(
        %period,
        ?data_type,
        original,
        processed = output.len(),
        sampling = ?config.sampling_strategy,
        "Smoothed points"
    );
    output
}

/// Splits the span of `points` into `target` equal-width time buckets and
/// emits one 0/1 point per non-empty bucket at the bucket's midpoint.
///
/// `points` must be sorted by date.
pub fn binary_buckets(points: &[DataPoint], target: usize) -> Vec<DataPoint> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let target = target.max(1);
    let span_ms = (last.date - first.date).num_milliseconds();
    let width = span_ms as f64 / target as f64;

    let mut buckets = vec![(0.0_f64, 0_usize); target];
    for point in points {
        let offset = (point.date - first.date).num_milliseconds() as f64;
        let index = if width > 0.0 {
            ((offset / width) as usize).min(target - 1)
        } else {
            0
        };
        buckets[index].0 += point.value;
        buckets[index].1 += 1;
    }

    buckets
        .into_iter()
        .enumerate()
        .filter(|(_, (_, n))| *n > 0)
        .map(|(i, (sum, n))| {
            let value = if sum / n as f64 >= 0.5 { 1.0 } else { 0.0 };
            let midpoint = first.date
                + TimeDelta::milliseconds((width * (i as f64 + 0.5)).round() as i64);
            DataPoint::derived(
                midpoint,
                value,
                Some(RawValue::Boolean(value == 1.0)),
                &first.metric_id,
            )
        })
        .collect()
}

/// Keeps every Nth point, `N = max(1, len / target)`.
pub fn sample_uniform(points: &[DataPoint], target: usize) -> Vec<DataPoint> {
    let stride = (points.len() / target.max(1)).max(1);
    points.iter().step_by(stride).cloned().collect()
}

/// Picks the nearest point to each of `target` evenly spaced instants across
/// the span of `points`, dropping repeat picks. `points` must be sorted.
pub fn sample_time_grid(points: &[DataPoint], target: usize) -> Vec<DataPoint> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let start = first.date.timestamp_millis();
    let span = last.date.timestamp_millis() - start;
    let target = target.max(1);

    let mut seen = vec![false; points.len()];
    let mut sampled = Vec::with_capacity(target.min(points.len()));
    for k in 0..target {
        let anchor = if target == 1 {
            start
        } else {
            start + (span as f64 * k as f64 / (target - 1) as f64).round() as i64
        };
        let index = nearest_index(points, anchor);
        if !seen[index] {
            seen[index] = true;
            sampled.push(points[index].clone());
        }
    }
    sampled
}

fn nearest_index(points: &[DataPoint], anchor_ms: i64) -> usize {
    let after = points.partition_point(|p| p.date.timestamp_millis() < anchor_ms);
    if after == 0 {
        return 0;
    }
    if after == points.len() {
        return points.len() - 1;
    }
    let before_gap = anchor_ms - points[after - 1].date.timestamp_millis();
    let after_gap = points[after].date.timestamp_millis() - anchor_ms;
    if after_gap < before_gap { after } else { after - 1 }
}

/// Replaces each value with a tricube-weighted average of its neighbours.
///
/// The window holds `max(3, round(n * bandwidth))` points centred on each
/// index and clamped to the sequence; distances are scaled by the window's own
/// time span. Dates, ids and raw values are kept. A point whose weighted
/// average is not finite keeps its original value.
pub fn loess_smooth(points: &[DataPoint], bandwidth: f64) -> Vec<DataPoint> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }
    let window = ((n as f64 * bandwidth).round() as usize).max(MIN_WINDOW);
    let half = window / 2;

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let neighbours = &points[i.saturating_sub(half)..=(i + half).min(n - 1)];
            let span = match (neighbours.first(), neighbours.last()) {
                (Some(a), Some(b)) => (b.date - a.date).num_milliseconds() as f64,
                _ => 0.0,
            };

            let weights: Vec<f64> = neighbours
                .iter()
                .map(|neighbour| {
                    let gap = (neighbour.date - point.date).num_milliseconds().abs() as f64;
                    if span > 0.0 { tricube(gap / span) } else { 1.0 }
                })
                .collect();
            let total: f64 = weights.iter().sum();

            let mut smoothed = point.clone();
            if total > 0.0 {
                // Normalised weights keep the sum a convex combination of
                // finite values.
                let value: f64 = weights
                    .iter()
                    .zip(neighbours)
                    .map(|(w, neighbour)| w / total * neighbour.value)
                    .sum();
                if value.is_finite() {
                    smoothed.value = value;
                }
            }
            smoothed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    fn daily(values: impl IntoIterator<Item = f64>) -> Vec<DataPoint> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(start() + TimeDelta::days(i as i64), v, None, "m").unwrap())
            .collect()
    }

    #[test]
    fn test_processing_table() {
        assert!(!processing_config(TimePeriod::Week, 5000).should_process);
        assert!(!processing_config(TimePeriod::Month, 5000).should_process);
        assert!(!processing_config(TimePeriod::ThreeMonths, 60).should_process);

        let six = processing_config(TimePeriod::SixMonths, 81);
        assert!(six.should_process);
        assert_eq!(six.target_data_points, 60);
        assert_eq!(six.sampling_strategy, SamplingStrategy::TimeBasedGrid);

        assert_eq!(
            processing_config(TimePeriod::AllTime, 2000).sampling_strategy,
            SamplingStrategy::Uniform
        );
        let idle = processing_config(TimePeriod::Year, 20);
        assert_eq!(idle.target_data_points, 20);
        assert_eq!(idle.sampling_strategy, SamplingStrategy::None);
    }

    #[test]
    fn test_short_range_returns_sorted_input() {
        let mut input = daily([3.0, 9.0, 1.0, 4.0]);
        input.reverse();
        let output = process(&input, TimePeriod::Month, DataType::Continuous);

        let values: Vec<f64> = output.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 9.0, 1.0, 4.0]);
    }

    #[test]
    fn test_binary_six_months_hits_target() {
        let input = daily((0..200).map(|i| if i % 3 == 0 { 0.0 } else { 1.0 }));
        let output = process(&input, TimePeriod::SixMonths, DataType::Binary);

        assert_eq!(output.len(), 60);
        assert!(output.iter().all(|p| p.value == 0.0 || p.value == 1.0));
        assert!(output.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_binary_buckets_round_majority() {
        let input = daily([1.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let output = binary_buckets(&input, 2);

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].value, 1.0);
        assert_eq!(output[0].raw_value, Some(RawValue::Boolean(true)));
        assert_eq!(output[1].value, 0.0);
        // Span of five days split in two: midpoints at 1.25 and 3.75 days.
        assert_eq!(output[0].date, start() + TimeDelta::hours(30));
        assert_eq!(output[1].date, start() + TimeDelta::hours(90));
    }

    #[test]
    fn test_binary_buckets_skip_empty_buckets() {
        let mut input = daily([1.0, 1.0]);
        input.push(DataPoint::new(start() + TimeDelta::days(30), 0.0, None, "m").unwrap());
        let output = binary_buckets(&input, 10);
        assert_eq!(output.len(), 2);
    }

    #[test]
    fn test_uniform_sampling_stride() {
        let input = daily((0..150).map(f64::from));
        let sampled = sample_uniform(&input, 45);

        assert_eq!(sampled.len(), 50);
        assert_eq!(sampled[1].value, 3.0);
    }

    #[test]
    fn test_time_grid_dedupes_sparse_edges() {
        // Dense burst at the start, then a single late point.
        let mut input = daily((0..10).map(f64::from));
        input.push(DataPoint::new(start() + TimeDelta::days(100), 99.0, None, "m").unwrap());

        let sampled = sample_time_grid(&input, 20);

        assert!(sampled.len() < 20);
        assert_eq!(sampled.first().map(|p| p.value), Some(0.0));
        assert_eq!(sampled.last().map(|p| p.value), Some(99.0));
        assert!(sampled.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_loess_keeps_constant_series() {
        let input = daily(std::iter::repeat_n(4.0, 30));
        let smoothed = loess_smooth(&input, 0.2);

        assert!(smoothed.iter().all(|p| (p.value - 4.0).abs() < 1e-12));
        let dates: Vec<_> = smoothed.iter().map(|p| p.date).collect();
        let expected: Vec<_> = input.iter().map(|p| p.date).collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_loess_damps_alternating_series() {
        let input = daily((0..40).map(|i| if i % 2 == 0 { 0.0 } else { 10.0 }));
        let smoothed = loess_smooth(&input, 0.25);

        let interior = &smoothed[5..35];
        assert!(interior.iter().all(|p| p.value > 2.0 && p.value < 8.0));
    }

    #[test]
    fn test_loess_huge_values_stay_finite() {
        let input = daily([f64::MAX, f64::MAX, 1e308, f64::MAX, f64::MAX]);
        let smoothed = loess_smooth(&input, 0.5);

        assert_eq!(smoothed.len(), 5);
        assert!(smoothed.iter().all(|p| p.value.is_finite()));
    }

    #[test]
    fn test_loess_single_point() {
        let input = daily([7.0]);
        assert_eq!(loess_smooth(&input, 0.5)[0].value, 7.0);
    }

    #[test]
    fn test_continuous_three_months_is_sampled_then_smoothed() {
        let input = daily((0..90).map(|i| (i % 10) as f64));
        let output = process(&input, TimePeriod::ThreeMonths, DataType::Continuous);

        assert_eq!(output.len(), 45);
        assert!(output.iter().all(|p| input.iter().any(|q| q.date == p.date)));
        assert!(output.iter().all(|p| p.value.is_finite()));
    }
}
