//! Output formatting for chart series.
//!
//! Supports pretty-printing to the log and JSON serialization to any writer.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Debug;
use std::io::Write;
use tracing::debug;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{AggregatedDataInfo, AggregationMethod};
    use crate::model::{DataPoint, GroupedDataPoint};
    use chrono::{TimeZone, Utc};

    fn point() -> DataPoint {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        DataPoint::new(date, 6.5, None, "mood").unwrap()
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&point());
    }

    #[test]
    fn test_write_json_points() {
        let mut buf = Vec::new();
        write_json(&mut buf, &vec![point()]).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["value"], 6.5);
        assert_eq!(parsed[0]["metric_id"], "mood");
    }

    #[test]
    fn test_write_json_info_uses_snake_case() {
        let mut buf = Vec::new();
        write_json(&mut buf, &AggregatedDataInfo::empty(AggregationMethod::Frequency)).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["method"], "frequency");
        assert_eq!(parsed["aggregation_level"], "daily");
        assert_eq!(parsed["original_count"], 0);
    }

    #[test]
    fn test_write_json_groups() {
        let group = GroupedDataPoint {
            date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            count: 2,
            value: "Mild".into(),
            numeric_value: 1.0,
        };
        let mut buf = Vec::new();
        write_json(&mut buf, &[group]).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["count"], 2);
        assert_eq!(parsed[0]["value"], "Mild");
    }
}
