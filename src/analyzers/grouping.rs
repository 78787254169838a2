use crate::model::{DataPoint, GroupedDataPoint};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use std::collections::BTreeMap;

/// Counts points per `(calendar day, formatted value)`.
///
/// Grouping is on the formatted label, so distinct codes that format the same
/// way merge. The first point seen for a key provides `numeric_value`.
/// Output is ordered by day, then label.
pub fn group<F, Tz>(points: &[DataPoint], formatter: F, calendar: &Tz) -> Vec<GroupedDataPoint>
where
    F: Fn(f64) -> String,
    Tz: TimeZone,
{
    let mut groups: BTreeMap<(DateTime<Utc>, String), GroupedDataPoint> = BTreeMap::new();

    for point in points {
        let day = start_of_day(point.date, calendar);
        let label = formatter(point.value);
        groups
            .entry((day, label.clone()))
            .and_modify(|g| g.count += 1)
            .or_insert_with(|| GroupedDataPoint {
                date: day,
                count: 1,
                value: label,
                numeric_value: point.value,
            });
    }

    groups.into_values().collect()
}

/// Midnight of `date`'s local day in `calendar`, expressed in UTC.
fn start_of_day<Tz: TimeZone>(date: DateTime<Utc>, calendar: &Tz) -> DateTime<Utc> {
    let local_day = date.with_timezone(calendar).date_naive();
    calendar
        .from_local_datetime(&local_day.and_time(NaiveTime::MIN))
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(date)
}
