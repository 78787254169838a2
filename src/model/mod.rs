//! Core data types shared by the cache, the analyzers and the chart service.

pub mod log;
pub mod period;
pub mod point;

pub use log::HealthLog;
pub use period::{DateRange, TimePeriod};
pub use point::{DataPoint, GroupedDataPoint, RawValue, sort_by_date};
