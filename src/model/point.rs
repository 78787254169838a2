use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed payload carried alongside a point's numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawValue {
    Numeric(f64),
    Boolean(bool),
    Categorical(String),
    List(Vec<String>),
    /// Constituent raw values of an aggregated bucket, oldest first.
    Bucket(Vec<RawValue>),
}

/// A single chartable observation for one metric.
///
/// `id` is independent of `(date, value)` so two records logged at the same
/// instant with the same value stay distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub value: f64,
    pub raw_value: Option<RawValue>,
    pub metric_id: String,
}

impl DataPoint {
    /// Creates a point with a fresh id. Returns `None` when `value` is NaN or
    /// infinite.
    pub fn new(
        date: DateTime<Utc>,
        value: f64,
        raw_value: Option<RawValue>,
        metric_id: &str,
    ) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Self::derived(date, value, raw_value, metric_id))
    }

    /// Builds a point from values the pipeline has already computed from
    /// finite inputs.
    pub(crate) fn derived(
        date: DateTime<Utc>,
        value: f64,
        raw_value: Option<RawValue>,
        metric_id: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            value,
            raw_value,
            metric_id: metric_id.to_string(),
        }
    }

    /// The raw payload, or the numeric value when none was recorded.
    pub fn raw_or_numeric(&self) -> RawValue {
        self.raw_value
            .clone()
            .unwrap_or(RawValue::Numeric(self.value))
    }
}

/// Sorts points ascending by date, keeping the input order for ties.
pub fn sort_by_date(points: &mut [DataPoint]) {
    points.sort_by_key(|p| p.date);
}

/// One `(day, formatted value)` bucket produced by the day grouper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedDataPoint {
    pub date: DateTime<Utc>,
    pub count: usize,
    pub value: String,
    pub numeric_value: f64,
}
