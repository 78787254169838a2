use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day's health entry as stored by the log store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthLog {
    pub date: DateTime<Utc>,
    pub mood: Option<f64>,
    pub pain: Option<f64>,
    pub energy: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub medication_taken: Option<bool>,
    /// Symptom name to severity rating (0 = none .. 3 = severe).
    pub symptoms: BTreeMap<String, f64>,
    pub activities: Vec<String>,
    pub notes: Option<String>,
}

impl HealthLog {
    /// An empty log for `date`.
    pub fn on(date: DateTime<Utc>) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }
}
