use super::client::LogSource;
use crate::model::HealthLog;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A [`LogSource`] backed by a CSV export of the log store.
///
/// Expected header:
/// `date,mood,pain,energy,sleep_hours,medication_taken,symptoms,activities,notes`.
/// Every column but `date` may be empty or missing. `symptoms` holds
/// `name:rating` pairs and `activities` holds names, both joined by `;`.
pub struct CsvLogSource {
    path: PathBuf,
}

impl CsvLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LogSource for CsvLogSource {
    async fn fetch_all(&self) -> Result<Vec<HealthLog>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_logs(&path)).await?
    }
}

#[derive(Debug, Deserialize)]
struct LogRow {
    date: String,
    #[serde(default)]
    mood: Option<f64>,
    #[serde(default)]
    pain: Option<f64>,
    #[serde(default)]
    energy: Option<f64>,
    #[serde(default)]
    sleep_hours: Option<f64>,
    #[serde(default)]
    medication_taken: Option<String>,
    #[serde(default)]
    symptoms: Option<String>,
    #[serde(default)]
    activities: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Reads every log in the CSV file at `path`.
pub fn load_logs(path: &Path) -> Result<Vec<HealthLog>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut logs = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        // +2: one for the header, one for 1-based line numbers.
        let line = i + 2;
        let row: LogRow = result.with_context(|| format!("{} line {line}", path.display()))?;
        logs.push(row_to_log(row).with_context(|| format!("{} line {line}", path.display()))?);
    }

    debug!(path = %path.display(), count = logs.len(), "Loaded logs from CSV");
    Ok(logs)
}

fn row_to_log(row: LogRow) -> Result<HealthLog> {
    Ok(HealthLog {
        date: parse_date(&row.date)?,
        mood: row.mood,
        pain: row.pain,
        energy: row.energy,
        sleep_hours: row.sleep_hours,
        medication_taken: non_empty(row.medication_taken)
            .map(|s| parse_bool(&s))
            .transpose()?,
        symptoms: non_empty(row.symptoms)
            .map(|s| parse_symptoms(&s))
            .transpose()?
            .unwrap_or_default(),
        activities: non_empty(row.activities)
            .map(|s| split_list(&s).map(str::to_string).collect())
            .unwrap_or_default(),
        notes: non_empty(row.notes),
    })
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(';').map(str::trim).filter(|part| !part.is_empty())
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or RFC 3339.
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(crate::model::period::start_of(day));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .with_context(|| format!("invalid date '{s}'"))
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => bail!("invalid boolean '{other}'"),
    }
}

fn parse_symptoms(s: &str) -> Result<BTreeMap<String, f64>> {
    split_list(s)
        .map(|pair| {
            let (name, rating) = pair
                .split_once(':')
                .ok_or_else(|| anyhow!("symptom '{pair}' is missing ':rating'"))?;
            let rating: f64 = rating
                .trim()
                .parse()
                .with_context(|| format!("invalid rating for symptom '{name}'"))?;
            Ok((name.trim().to_string(), rating))
        })
        .collect()
}
