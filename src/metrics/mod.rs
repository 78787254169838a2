//! Metric extraction and labelling.
//!
//! [`MetricProvider`] pulls one metric's points out of raw logs and formats
//! its values for axes and legends. [`MetricRegistry`] maps metric ids to
//! providers for callers that only know the id.

mod builtin;

pub use builtin::{
    ActivityCountMetric, EnergyMetric, MedicationMetric, MoodMetric, PainMetric, SleepMetric,
    SymptomMetric,
};

use crate::analyzers::types::DataType;
use crate::model::{DataPoint, HealthLog};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Extraction and formatting for one tracked metric.
pub trait MetricProvider: Send + Sync {
    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    fn data_type(&self) -> DataType;

    /// Points for every log that has a finite value for this metric, in log order.
    fn extract_points(&self, logs: &[HealthLog]) -> Vec<DataPoint>;

    fn format_value(&self, value: f64) -> String;
}

/// Providers keyed by metric id.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    providers: BTreeMap<String, Arc<dyn MetricProvider>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in metrics plus one symptom metric per name in `symptoms`.
    pub fn with_defaults<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        registry.register(MoodMetric);
        registry.register(PainMetric);
        registry.register(EnergyMetric);
        registry.register(SleepMetric);
        registry.register(MedicationMetric);
        registry.register(ActivityCountMetric);
        for name in symptoms {
            registry.register(SymptomMetric::new(name.as_ref()));
        }
        registry
    }

    /// Adds `provider`, replacing any provider with the same id.
    pub fn register<P: MetricProvider + 'static>(&mut self, provider: P) {
        self.providers
            .insert(provider.id().to_string(), Arc::new(provider));
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn MetricProvider>> {
        self.providers.get(id).cloned()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn MetricProvider>> {
        self.providers.values()
    }
}

/// Every symptom name mentioned in `logs`, sorted.
pub fn symptom_names(logs: &[HealthLog]) -> BTreeSet<String> {
    logs.iter()
        .flat_map(|log| log.symptoms.keys().cloned())
        .collect()
}
