use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::types::AggregationLevel;

/// Display window a chart can be asked to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimePeriod {
    Week,
    Month,
    ThreeMonths,
    SixMonths,
    Year,
    AllTime,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 6] = [
        TimePeriod::Week,
        TimePeriod::Month,
        TimePeriod::ThreeMonths,
        TimePeriod::SixMonths,
        TimePeriod::Year,
        TimePeriod::AllTime,
    ];

    /// Number of calendar days covered, or `None` for all time.
    pub fn days(self) -> Option<i64> {
        match self {
            TimePeriod::Week => Some(7),
            TimePeriod::Month => Some(30),
            TimePeriod::ThreeMonths => Some(90),
            TimePeriod::SixMonths => Some(180),
            TimePeriod::Year => Some(365),
            TimePeriod::AllTime => None,
        }
    }

    /// Bucket coarseness this period gets before density escalation.
    pub fn natural_level(self) -> AggregationLevel {
        match self {
            TimePeriod::Week | TimePeriod::Month => AggregationLevel::Daily,
            TimePeriod::ThreeMonths | TimePeriod::SixMonths => AggregationLevel::Weekly,
            TimePeriod::Year | TimePeriod::AllTime => AggregationLevel::Monthly,
        }
    }

    /// Inclusive range ending with the last instant of `now`'s UTC day.
    pub fn date_range(self, now: DateTime<Utc>) -> Option<DateRange> {
        let days = self.days()?;
        let today = now.date_naive();
        let first = today - TimeDelta::days(days - 1);
        let tomorrow = today + TimeDelta::days(1);
        Some(DateRange {
            start: start_of(first),
            end: start_of(tomorrow) - TimeDelta::nanoseconds(1),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::Week => "week",
            TimePeriod::Month => "month",
            TimePeriod::ThreeMonths => "three-months",
            TimePeriod::SixMonths => "six-months",
            TimePeriod::Year => "year",
            TimePeriod::AllTime => "all-time",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimePeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown period '{s}'"))
    }
}

/// Closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start <= date && date <= self.end
    }
}

pub(crate) fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}
