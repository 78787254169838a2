//! Chart-facing entry points tying the cache, metric providers and analyzers
//! together.

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::grouping::group;
use crate::analyzers::policy::get_optimal_config;
use crate::analyzers::smoothing::process;
use crate::analyzers::types::{AggregatedDataInfo, AggregationMethod};
use crate::cache::CacheCoordinator;
use crate::metrics::{MetricProvider, MetricRegistry};
use crate::model::{DataPoint, GroupedDataPoint, TimePeriod, sort_by_date};
use crate::source::LogSource;
use chrono::FixedOffset;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ChartDataService<S> {
    cache: Arc<CacheCoordinator<S>>,
    registry: MetricRegistry,
    calendar: FixedOffset,
}

impl<S: LogSource> ChartDataService<S> {
    pub fn new(
        cache: Arc<CacheCoordinator<S>>,
        registry: MetricRegistry,
        calendar: FixedOffset,
    ) -> Self {
        Self {
            cache,
            registry,
            calendar,
        }
    }

    pub fn cache(&self) -> &Arc<CacheCoordinator<S>> {
        &self.cache
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Raw points of `metric_id` inside `period`, sorted by date.
    #[tracing::instrument(skip(self))]
    pub async fn get_points(&self, metric_id: &str, period: TimePeriod) -> Vec<DataPoint> {
        match self.provider(metric_id) {
            Some(provider) => self.points_for(provider.as_ref(), period).await,
            None => Vec::new(),
        }
    }

    /// Points bucketed for display. `max_points` overrides the cap picked for
    /// the metric's data type.
    #[tracing::instrument(skip(self))]
    pub async fn get_aggregated_points(
        &self,
        metric_id: &str,
        period: TimePeriod,
        max_points: Option<usize>,
    ) -> (Vec<DataPoint>, AggregatedDataInfo) {
        let Some(provider) = self.provider(metric_id) else {
            return (Vec::new(), AggregatedDataInfo::empty(AggregationMethod::Average));
        };

        let points = self.points_for(provider.as_ref(), period).await;
        let mut config = get_optimal_config(provider.data_type(), points.len());
        if let Some(max) = max_points {
            config.max_data_points = max;
        }
        aggregate(&points, period, &config)
    }

    /// Points thinned and smoothed for long ranges.
    #[tracing::instrument(skip(self))]
    pub async fn get_smoothed_points(&self, metric_id: &str, period: TimePeriod) -> Vec<DataPoint> {
        let Some(provider) = self.provider(metric_id) else {
            return Vec::new();
        };
        let points = self.points_for(provider.as_ref(), period).await;
        process(&points, period, provider.data_type())
    }

    /// Per-day counts of each formatted value, for stacked charts.
    #[tracing::instrument(skip(self))]
    pub async fn get_grouped_points(
        &self,
        metric_id: &str,
        period: TimePeriod,
    ) -> Vec<GroupedDataPoint> {
        let Some(provider) = self.provider(metric_id) else {
            return Vec::new();
        };
        let points = self.points_for(provider.as_ref(), period).await;
        group(&points, |v| provider.format_value(v), &self.calendar)
    }

    /// Call after any write to the log store.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all().await;
    }

    pub async fn invalidate_session(&self) {
        self.cache.invalidate_session().await;
    }

    fn provider(&self, metric_id: &str) -> Option<Arc<dyn MetricProvider>> {
        let provider = self.registry.get(metric_id);
        if provider.is_none() {
            warn!(metric_id, "Unknown metric requested");
        }
        provider
    }

    async fn points_for(&self, provider: &dyn MetricProvider, period: TimePeriod) -> Vec<DataPoint> {
        let logs = self.cache.filter_by_period(period).await;
        let mut points = provider.extract_points(&logs);
        sort_by_date(&mut points);
        debug!(metric_id = provider.id(), count = points.len(), "Extracted points");
        points
    }
}
