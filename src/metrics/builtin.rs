use super::MetricProvider;
use crate::analyzers::types::DataType;
use crate::model::{DataPoint, HealthLog, RawValue};

/// Builds one point per log for which `read` yields a value.
fn extract_with<F>(logs: &[HealthLog], metric_id: &str, read: F) -> Vec<DataPoint>
where
    F: Fn(&HealthLog) -> Option<(f64, RawValue)>,
{
    logs.iter()
        .filter_map(|log| {
            let (value, raw) = read(log)?;
            DataPoint::new(log.date, value, Some(raw), metric_id)
        })
        .collect()
}

fn whole_number(value: f64) -> String {
    format!("{value:.0}")
}

/// Daily mood on a 1–10 scale.
pub struct MoodMetric;

impl MetricProvider for MoodMetric {
    fn id(&self) -> &str {
        "mood"
    }

    fn display_name(&self) -> &str {
        "Mood"
    }

    fn data_type(&self) -> DataType {
        DataType::Continuous
    }

    fn extract_points(&self, logs: &[HealthLog]) -> Vec<DataPoint> {
        extract_with(logs, self.id(), |log| log.mood.map(|v| (v, RawValue::Numeric(v))))
    }

    fn format_value(&self, value: f64) -> String {
        whole_number(value)
    }
}

/// Pain level on a 0–10 scale.
pub struct PainMetric;

impl MetricProvider for PainMetric {
    fn id(&self) -> &str {
        "pain"
    }

    fn display_name(&self) -> &str {
        "Pain"
    }

    fn data_type(&self) -> DataType {
        DataType::Continuous
    }

    fn extract_points(&self, logs: &[HealthLog]) -> Vec<DataPoint> {
        extract_with(logs, self.id(), |log| log.pain.map(|v| (v, RawValue::Numeric(v))))
    }

    fn format_value(&self, value: f64) -> String {
        whole_number(value)
    }
}

/// Energy on a 1–5 scale, shown as three bands.
pub struct EnergyMetric;

impl EnergyMetric {
    fn band(value: f64) -> &'static str {
        match value.round() as i64 {
            i64::MIN..=2 => "Low",
            3 => "Moderate",
            _ => "High",
        }
    }
}

impl MetricProvider for EnergyMetric {
    fn id(&self) -> &str {
        "energy"
    }

    fn display_name(&self) -> &str {
        "Energy"
    }

    fn data_type(&self) -> DataType {
        DataType::Categorical
    }

    fn extract_points(&self, logs: &[HealthLog]) -> Vec<DataPoint> {
        extract_with(logs, self.id(), |log| {
            log.energy
                .map(|v| (v, RawValue::Categorical(Self::band(v).to_string())))
        })
    }

    fn format_value(&self, value: f64) -> String {
        Self::band(value).to_string()
    }
}

/// Hours slept.
pub struct SleepMetric;

impl MetricProvider for SleepMetric {
    fn id(&self) -> &str {
        "sleep"
    }

    fn display_name(&self) -> &str {
        "Sleep"
    }

    fn data_type(&self) -> DataType {
        DataType::Continuous
    }

    fn extract_points(&self, logs: &[HealthLog]) -> Vec<DataPoint> {
        extract_with(logs, self.id(), |log| {
            log.sleep_hours.map(|v| (v, RawValue::Numeric(v)))
        })
    }

    fn format_value(&self, value: f64) -> String {
        format!("{value:.1}h")
    }
}

/// Whether the day's medication was taken (1) or missed (0).
pub struct MedicationMetric;

impl MetricProvider for MedicationMetric {
    fn id(&self) -> &str {
        "medication"
    }

    fn display_name(&self) -> &str {
        "Medication"
    }

    fn data_type(&self) -> DataType {
        DataType::Binary
    }

    fn extract_points(&self, logs: &[HealthLog]) -> Vec<DataPoint> {
        extract_with(logs, self.id(), |log| {
            log.medication_taken
                .map(|taken| (if taken { 1.0 } else { 0.0 }, RawValue::Boolean(taken)))
        })
    }

    fn format_value(&self, value: f64) -> String {
        let label = if value >= 0.5 { "Taken" } else { "Missed" };
        label.to_string()
    }
}

/// Number of activities logged per day. Days without activities count as 0.
pub struct ActivityCountMetric;

impl MetricProvider for ActivityCountMetric {
    fn id(&self) -> &str {
        "activity_count"
    }

    fn display_name(&self) -> &str {
        "Activities"
    }

    fn data_type(&self) -> DataType {
        DataType::Count
    }

    fn extract_points(&self, logs: &[HealthLog]) -> Vec<DataPoint> {
        extract_with(logs, self.id(), |log| {
            Some((
                log.activities.len() as f64,
                RawValue::List(log.activities.clone()),
            ))
        })
    }

    fn format_value(&self, value: f64) -> String {
        whole_number(value)
    }
}

/// Severity rating (0–3) of one named symptom. Id is `symptom:<name>`.
pub struct SymptomMetric {
    name: String,
    id: String,
}

impl SymptomMetric {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: format!("symptom:{name}"),
        }
    }
}

impl MetricProvider for SymptomMetric {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn data_type(&self) -> DataType {
        DataType::Categorical
    }

    fn extract_points(&self, logs: &[HealthLog]) -> Vec<DataPoint> {
        extract_with(logs, &self.id, |log| {
            log.symptoms
                .get(&self.name)
                .map(|v| (*v, RawValue::Numeric(*v)))
        })
    }

    fn format_value(&self, value: f64) -> String {
        let label = match value.round() as i64 {
            i64::MIN..=0 => "None",
            1 => "Mild",
            2 => "Moderate",
            _ => "Severe",
        };
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn logs() -> Vec<HealthLog> {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut first = HealthLog::on(start);
        first.mood = Some(6.0);
        first.medication_taken = Some(false);
        first.symptoms.insert("headache".into(), 2.0);
        first.activities = vec!["walk".into(), "swim".into()];

        let mut second = HealthLog::on(start + TimeDelta::days(1));
        second.mood = Some(f64::NAN);
        second.energy = Some(5.0);

        vec![first, second]
    }

    #[test]
    fn test_extract_skips_missing_and_non_finite() {
        let points = MoodMetric.extract_points(&logs());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 6.0);
        assert_eq!(points[0].metric_id, "mood");
    }

    #[test]
    fn test_medication_is_binary() {
        let points = MedicationMetric.extract_points(&logs());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 0.0);
        assert_eq!(points[0].raw_value, Some(RawValue::Boolean(false)));
        assert_eq!(MedicationMetric.format_value(1.0), "Taken");
    }

    #[test]
    fn test_activity_count_includes_empty_days() {
        let values: Vec<f64> = ActivityCountMetric
            .extract_points(&logs())
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![2.0, 0.0]);
    }

    #[test]
    fn test_symptom_metric() {
        let headache = SymptomMetric::new("headache");
        let points = headache.extract_points(&logs());

        assert_eq!(headache.id(), "symptom:headache");
        assert_eq!(points.len(), 1);
        assert_eq!(headache.format_value(points[0].value), "Moderate");
        assert_eq!(headache.format_value(0.0), "None");
        assert_eq!(headache.format_value(3.0), "Severe");
    }

    #[test]
    fn test_energy_bands_merge_codes() {
        assert_eq!(EnergyMetric.format_value(1.0), EnergyMetric.format_value(2.0));
        assert_eq!(EnergyMetric.format_value(3.0), "Moderate");
        assert_eq!(EnergyMetric.format_value(5.0), "High");
    }

    #[test]
    fn test_sleep_format() {
        assert_eq!(SleepMetric.format_value(7.0), "7.0h");
        assert_eq!(SleepMetric.format_value(6.46), "6.5h");
    }
}
