//! Point reduction for charts.
//!
//! This module buckets long series into daily, weekly or monthly points,
//! smooths and thins long ranges with tricube-weighted local regression, and
//! counts categorical values per day for stacked charts. Everything here is
//! a pure function of its inputs.

pub mod aggregate;
pub mod grouping;
pub mod policy;
pub mod smoothing;
pub mod types;
pub mod utility;
