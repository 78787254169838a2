use crate::analyzers::types::{
    AggregatedDataInfo, AggregationConfig, AggregationLevel, AggregationMethod,
};
use crate::analyzers::utility::{mean, mode, non_zero_percent};
use crate::model::period::start_of;
use crate::model::{DataPoint, RawValue, TimePeriod, sort_by_date};
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Point counts at or below this are never bucketed.
const SPARSE_LIMIT: usize = 50;
/// Above this, the natural level is always escalated one step.
const DENSE_LIMIT: usize = 150;

/// Calendar key a point is bucketed under. Weeks use ISO week numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BucketKey {
    Day { year: i32, month: u32, day: u32 },
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
}

impl BucketKey {
    fn for_date(date: DateTime<Utc>, level: AggregationLevel) -> Self {
        match level {
            AggregationLevel::Daily => BucketKey::Day {
                year: date.year(),
                month: date.month(),
                day: date.day(),
            },
            AggregationLevel::Weekly => {
                let iso = date.iso_week();
                BucketKey::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
            AggregationLevel::Monthly => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    /// First instant of the bucket. Falls back to now if the key does not
    /// name a real calendar date.
    fn start_date(self) -> DateTime<Utc> {
        let day = match self {
            BucketKey::Day { year, month, day } => NaiveDate::from_ymd_opt(year, month, day),
            BucketKey::Week { year, week } => NaiveDate::from_isoywd_opt(year, week, Weekday::Mon),
            BucketKey::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
        };
        day.map(start_of).unwrap_or_else(Utc::now)
    }
}

/// Picks the bucket level for `count` points displayed over `period`.
pub fn select_level(count: usize, period: TimePeriod, max_data_points: usize) -> AggregationLevel {
    if count <= max_data_points || count <= SPARSE_LIMIT {
        return AggregationLevel::Daily;
    }

    let natural = period.natural_level();
    if count <= DENSE_LIMIT {
        if natural == AggregationLevel::Daily {
            natural.escalated()
        } else {
            natural
        }
    } else {
        natural.escalated()
    }
}

/// Reduces `points` to at most one point per calendar bucket of `period`.
///
/// Daily output is the sorted input unchanged. When bucketing runs and the
/// selected level still yields more than `max_data_points` buckets, the level
/// is coarsened further until the cap holds or the level is monthly.
pub fn aggregate(
    points: &[DataPoint],
    period: TimePeriod,
    config: &AggregationConfig,
) -> (Vec<DataPoint>, AggregatedDataInfo) {
    if points.is_empty() {
        return (Vec::new(), AggregatedDataInfo::empty(config.method));
    }

    let mut sorted = points.to_vec();
    sort_by_date(&mut sorted);
    let original_count = sorted.len();

    let mut level = select_level(original_count, period, config.max_data_points);
    let output = if level == AggregationLevel::Daily {
        sorted
    } else {
        let mut buckets = aggregate_at_level(&sorted, level, config.method);
        while buckets.len() > config.max_data_points && level < AggregationLevel::Monthly {
            level = level.escalated();
            buckets = aggregate_at_level(&sorted, level, config.method);
        }
        buckets
    };

    let info = AggregatedDataInfo {
        original_count,
        aggregated_count: output.len(),
        aggregation_level: level,
        method: config.method,
    };

    debug!(
        %period,
        original = info.original_count,
        aggregated = info.aggregated_count,
        level = ?info.aggregation_level,
        method = ?info.method,
        "Aggregated points"
    );

    (output, info)
}

/// Buckets `points` at a fixed `level` and reduces each bucket with `method`.
///
/// Each output point is dated at the start of its bucket, inherits the first
/// constituent's metric id, and carries every constituent raw value. A bucket
/// whose reduction overflows (a sum near `f64::MAX`) is dropped.
pub fn aggregate_at_level(
    points: &[DataPoint],
    level: AggregationLevel,
    method: AggregationMethod,
) -> Vec<DataPoint> {
    let mut sorted: Vec<&DataPoint> = points.iter().collect();
    sorted.sort_by_key(|p| p.date);

    let mut buckets: BTreeMap<BucketKey, Vec<&DataPoint>> = BTreeMap::new();
    for point in sorted {
        buckets
            .entry(BucketKey::for_date(point.date, level))
            .or_default()
            .push(point);
    }

    let mut output: Vec<DataPoint> = buckets
        .into_iter()
        .filter_map(|(key, members)| {
            let first = members.first()?;
            let value = reduce(&members, method);
            let raw = members.iter().map(|p| p.raw_or_numeric()).collect();
            let point = DataPoint::new(
                key.start_date(),
                value,
                Some(RawValue::Bucket(raw)),
                &first.metric_id,
            );
            if point.is_none() {
                warn!(?key, ?method, "Dropped bucket whose reduced value is not finite");
            }
            point
        })
        .collect();

    sort_by_date(&mut output);
    output
}

fn reduce(members: &[&DataPoint], method: AggregationMethod) -> f64 {
    let values: Vec<f64> = members.iter().map(|p| p.value).collect();
    match method {
        AggregationMethod::Average => mean(&values),
        AggregationMethod::Sum => values.iter().sum(),
        AggregationMethod::Frequency => non_zero_percent(&values),
        AggregationMethod::Mode => mode(&values).unwrap_or(0.0),
        AggregationMethod::Latest => values.last().copied().unwrap_or(0.0),
    }
}
